//! Presentation Layer
//!
//! HTTP handlers, DTOs and the router. JSON follows the RealWorld envelope
//! shape (`{"user": ...}`, `{"article": ...}`) with camelCase fields.

pub mod dto;
pub mod handlers;
pub mod router;
