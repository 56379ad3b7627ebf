//! Value Object Module

pub mod account_id;
pub mod email;
pub mod session_handle;
pub mod user_password;
pub mod username;

pub use account_id::AccountId;
pub use email::Email;
pub use session_handle::SessionHandle;
pub use user_password::{RawPassword, UserPassword};
pub use username::Username;
