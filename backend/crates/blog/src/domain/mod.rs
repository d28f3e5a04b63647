//! Domain Layer
//!
//! Contains the blog entities, their patches and validation rules, and the
//! repository interfaces implemented by the infrastructure layer.

pub mod entity;
pub mod repository;
