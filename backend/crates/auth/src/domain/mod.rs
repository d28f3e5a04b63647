//! Domain Layer
//!
//! Token vocabulary shared by the service and the HTTP layer.

pub mod claims;
pub mod context;
pub mod token;
