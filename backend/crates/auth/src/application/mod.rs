//! Application Layer

pub mod config;
pub mod token_service;
