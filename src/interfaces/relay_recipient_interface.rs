// src/interfaces/relay_recipient_interface.rs
//! Relay Recipient Interface
//!
//! The two-phase contract a relay hub drives: a read-only acceptance check,
//! then execution of the accepted call.

use solana_program::pubkey::Pubkey;

use crate::fee_optimization::RelayDecision;
use crate::relay_hub::{RelayExecution, RelayRequest};

/// Contract a relay hub uses to forward meta-transactions
pub trait RelayRecipient {
    /// Hub identity this recipient trusts
    fn relay_hub(&self) -> Pubkey;

    /// Decide whether `request` would be accepted. Must not change state.
    fn accept_relayed_call(&self, request: &RelayRequest) -> RelayDecision;

    /// Execute an accepted request. The reported status matches whether the
    /// fee was actually charged.
    fn execute_relayed_call(&mut self, request: &RelayRequest) -> RelayExecution;
}
