pub mod account;
pub mod session;

pub use account::{Account, NewAccount, Profile};
pub use session::{AuthSession, SessionIdentity};
