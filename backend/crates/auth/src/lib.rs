//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and the session binder
//! - `infra/` - In-memory and PostgreSQL stores
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Account registration with unique username and email
//! - Username/password login
//! - Server-side sessions referenced by a signed cookie
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Hash work runs on the blocking pool
//! - Unknown usernames cost one hash, like a wrong password
//! - Session handles are HMAC-signed and reissued on every login

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::SessionBinder;
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAccountStore, MemorySessionStore, PgAccountStore, PgSessionStore};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
