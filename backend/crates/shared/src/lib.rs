//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest shared vocabulary of the blog backend:
//! - Unified error type, error kinds and result aliases
//! - Typed numeric identifiers for persisted entities
//! - Field-level validation violations
//!
//! Only things with the same meaning in every crate belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod validation;
