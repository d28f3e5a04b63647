//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no blog vocabulary:
//! - Cookie building and parsing
//! - Password hashing (Argon2id)

pub mod cookie;
pub mod password;
