// src/error_handling/mod.rs
//! Error handling for the relayed-fee token
//!
//! This module provides the crate-wide error type and the small helpers
//! used to log and raise it.

pub mod error_types;

// Re-export common types and functions
pub use error_types::{handle_error, handle_error_with_message, require, TokenError};
