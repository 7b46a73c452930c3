// src/fee_optimization/mod.rs
//! Relayed call handling
//!
//! This module contains the pieces that let users submit token calls
//! through a relay hub and pay the relay in tokens instead of network gas:
//! call routing, the acceptance policy and atomic fee settlement.

pub mod fee_settlement;
pub mod relay_adapter;
pub mod relay_policy;

// Re-export main components
pub use fee_settlement::{apply_operation, execute, SettlementReceipt};
pub use relay_adapter::{CallContext, NormalizedCall, RelayAdapter, RelayHubBinding, RelayMetadata};
pub use relay_policy::{
    ensure_covers, RejectReason, RelayDecision, RelayPolicy, RelayableOperation,
    RELAYED_CALL_ACCEPTED, RELAYED_CALL_REJECTED,
};
