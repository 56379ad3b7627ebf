//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password policy and hashing (Argon2id)
//! - Signed opaque tokens (HMAC-SHA256, Base64url)
//! - Cookie management

pub mod cookie;
pub mod crypto;
pub mod password;
