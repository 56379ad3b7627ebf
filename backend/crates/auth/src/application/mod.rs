//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod lookup;
pub mod register;
pub mod session_binder;

// Re-exports
pub use authenticate::{AuthenticateInput, AuthenticateUseCase};
pub use config::AuthConfig;
pub use lookup::AccountLookupUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use session_binder::SessionBinder;
