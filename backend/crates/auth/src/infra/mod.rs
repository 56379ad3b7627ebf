//! Infrastructure Layer
//!
//! Store implementations: process memory and PostgreSQL.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryAccountStore, MemorySessionStore};
pub use postgres::{PgAccountStore, PgSessionStore};
