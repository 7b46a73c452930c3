// src/fee_optimization/relay_policy.rs
//! Relay acceptance policy
//!
//! Decides whether a call forwarded by the relay hub is accepted and which
//! fee it pays. Only `approve`, `transfer` and `transferFrom` are relayable,
//! and the effective caller must hold the operation amount plus the fee.

use log::{debug, info};
use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::error_handling::TokenError;
use crate::ledger::Ledger;
use crate::token::TokenCall;

/// Acceptance code reported to the relay hub
pub const RELAYED_CALL_ACCEPTED: u64 = 0;

/// Base of the rejection codes reported to the relay hub
pub const RELAYED_CALL_REJECTED: u64 = 11;

/// Operations that may be invoked through the relay hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelayableOperation {
    Approve { spender: Pubkey, amount: u64 },
    Transfer { to: Pubkey, amount: u64 },
    TransferFrom { from: Pubkey, to: Pubkey, amount: u64 },
}

impl RelayableOperation {
    /// Tokens the operation takes out of `caller`'s own balance, fee excluded.
    /// `approve` moves nothing; `transferFrom` only draws on the caller when
    /// the caller is also the source account.
    pub fn required_from(&self, caller: &Pubkey) -> u64 {
        match *self {
            RelayableOperation::Approve { .. } => 0,
            RelayableOperation::Transfer { amount, .. } => amount,
            RelayableOperation::TransferFrom { from, amount, .. } => {
                if from == *caller {
                    amount
                } else {
                    0
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RelayableOperation::Approve { .. } => "approve",
            RelayableOperation::Transfer { .. } => "transfer",
            RelayableOperation::TransferFrom { .. } => "transferFrom",
        }
    }
}

/// Why a relayed call was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// The target operation is not in the relay whitelist
    OperationNotRelayable,
    /// The caller cannot cover the operation amount plus the fee
    InsufficientBalanceForFee,
}

impl RejectReason {
    /// Code reported to the relay hub
    pub fn code(self) -> u64 {
        match self {
            RejectReason::OperationNotRelayable => RELAYED_CALL_REJECTED,
            RejectReason::InsufficientBalanceForFee => RELAYED_CALL_REJECTED + 1,
        }
    }

    pub fn as_error(self) -> TokenError {
        match self {
            RejectReason::OperationNotRelayable => TokenError::OperationNotRelayable,
            RejectReason::InsufficientBalanceForFee => TokenError::InsufficientBalanceForFee,
        }
    }
}

/// Outcome of the acceptance check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelayDecision {
    /// Call accepted; `fee` will be charged if it executes successfully
    Accept { fee: u64 },
    /// Call rejected before execution
    Reject(RejectReason),
}

impl RelayDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RelayDecision::Accept { .. })
    }

    /// Code reported to the relay hub
    pub fn code(&self) -> u64 {
        match self {
            RelayDecision::Accept { .. } => RELAYED_CALL_ACCEPTED,
            RelayDecision::Reject(reason) => reason.code(),
        }
    }
}

/// Check that `balance` covers what `operation` takes from `caller` plus
/// `fee`. The boundary is inclusive.
pub fn ensure_covers(
    operation: &RelayableOperation,
    caller: &Pubkey,
    balance: u64,
    fee: u64,
) -> Result<(), RejectReason> {
    let required = operation
        .required_from(caller)
        .checked_add(fee)
        .ok_or(RejectReason::InsufficientBalanceForFee)?;

    if balance < required {
        debug!(
            "Caller {} holds {} but {} requires {}",
            caller,
            balance,
            operation.name(),
            required
        );
        return Err(RejectReason::InsufficientBalanceForFee);
    }

    Ok(())
}

/// Whitelist and fee schedule for relayed calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayPolicy {
    /// Fixed fee in token units charged per relayed call
    gsn_fee: u64,
}

impl RelayPolicy {
    pub fn new(gsn_fee: u64) -> Self {
        Self { gsn_fee }
    }

    pub fn gsn_fee(&self) -> u64 {
        self.gsn_fee
    }

    /// Check that `balance` covers what `operation` takes from `caller` plus
    /// the configured fee
    pub fn check_solvency(
        &self,
        operation: &RelayableOperation,
        caller: &Pubkey,
        balance: u64,
    ) -> Result<(), RejectReason> {
        ensure_covers(operation, caller, balance, self.gsn_fee)
    }

    /// Decide whether to accept `call` relayed on behalf of `caller`.
    ///
    /// The fee proposed by the hub is only logged; an accepted call is always
    /// bound to the configured fee.
    pub fn decide(
        &self,
        call: &TokenCall,
        caller: &Pubkey,
        proposed_fee: u64,
        ledger: &Ledger,
    ) -> RelayDecision {
        let operation = match call.relayable() {
            Some(operation) => operation,
            None => {
                info!("Rejecting relayed {} from {}: not relayable", call.name(), caller);
                return RelayDecision::Reject(RejectReason::OperationNotRelayable);
            }
        };

        if let Err(reason) = self.check_solvency(&operation, caller, ledger.balance_of(caller)) {
            info!(
                "Rejecting relayed {} from {}: {:?}",
                operation.name(),
                caller,
                reason
            );
            return RelayDecision::Reject(reason);
        }

        if proposed_fee != self.gsn_fee {
            debug!(
                "Relay proposed fee {} replaced by configured fee {}",
                proposed_fee, self.gsn_fee
            );
        }

        RelayDecision::Accept { fee: self.gsn_fee }
    }
}
