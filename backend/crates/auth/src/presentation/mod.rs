//! Presentation Layer
//!
//! axum glue: identity middleware and request extractors.

pub mod extractor;
pub mod middleware;
