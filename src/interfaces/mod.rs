// src/interfaces/mod.rs
//! Interfaces module
//!
//! Traits at the boundary between the token and the relay hub.

mod relay_recipient_interface;

pub use relay_recipient_interface::*;
