// src/token/mod.rs
//! The token contract
//!
//! Call payloads, initialization parameters, events and the `Token` type
//! tying the ledger, role guard and relay pipeline together.

pub mod config;
pub mod events;
pub mod instruction;
pub mod relayed_token;

pub use config::{TokenParams, MAX_DECIMALS};
pub use events::TokenEvent;
pub use instruction::{CallOutput, TokenCall};
pub use relayed_token::{Token, TokenMetadata};
