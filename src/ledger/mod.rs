// src/ledger/mod.rs
//! Token ledger
//!
//! Balances, allowances and total supply, with staged transactions that
//! commit atomically.

pub mod balances;

pub use balances::{Ledger, LedgerTransaction};
