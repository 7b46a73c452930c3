// src/relay_hub/local_hub.rs
//! In-process relay hub
//!
//! Drives a `RelayRecipient` the way an external hub does: ask for
//! acceptance, forward accepted requests, and report the outcome as a hub
//! event. Used to exercise recipients without a network.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::error_handling::TokenError;
use crate::fee_optimization::{RelayDecision, RelayHubBinding};
use crate::interfaces::RelayRecipient;
use crate::relay_hub::{RelayCallStatus, RelayRequest};
use crate::token::TokenCall;

/// Default gas price quoted by the local relay
pub const DEFAULT_GAS_PRICE: u64 = 1;

/// Default gas limit of forwarded calls
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;

/// Events emitted by the hub after handling a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RelayHubEvent {
    /// The recipient rejected the request; nothing was executed
    CanRelayFailed {
        request_id: String,
        relay: Pubkey,
        from: Pubkey,
        reason: u64,
    },
    /// The request was accepted and executed
    TransactionRelayed {
        request_id: String,
        relay: Pubkey,
        from: Pubkey,
        status: RelayCallStatus,
        charge: u64,
    },
}

/// Outcome of `LocalRelayHub::relay_call`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelayOutcome {
    /// Rejected before execution with the recipient's reason code
    Rejected { reason: u64 },
    /// Executed with `status`; `charge` is the fee actually charged
    Relayed { status: RelayCallStatus, charge: u64 },
}

impl RelayOutcome {
    /// Whether the wrapped operation committed
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            RelayOutcome::Relayed {
                status: RelayCallStatus::Ok,
                ..
            }
        )
    }
}

/// A relay hub with a single relay worker
#[derive(Debug, Clone)]
pub struct LocalRelayHub {
    /// Hub identity and fee recipient
    binding: RelayHubBinding,
    /// Relay worker submitting every request
    relay: Pubkey,
    gas_price: u64,
    gas_limit: u64,
    /// Next nonce by sender
    nonces: HashMap<Pubkey, u64>,
    /// Events emitted so far
    events: Vec<RelayHubEvent>,
}

impl LocalRelayHub {
    pub fn new(binding: RelayHubBinding, relay: Pubkey) -> Self {
        Self {
            binding,
            relay,
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: DEFAULT_GAS_LIMIT,
            nonces: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn binding(&self) -> RelayHubBinding {
        self.binding
    }

    pub fn relay(&self) -> Pubkey {
        self.relay
    }

    /// Nonce the next request of `from` will carry
    pub fn nonce(&self, from: &Pubkey) -> u64 {
        self.nonces.get(from).copied().unwrap_or(0)
    }

    pub fn events(&self) -> &[RelayHubEvent] {
        &self.events
    }

    /// Status of the most recent `TransactionRelayed` event
    pub fn last_relayed_status(&self) -> Option<RelayCallStatus> {
        self.events.iter().rev().find_map(|event| match event {
            RelayHubEvent::TransactionRelayed { status, .. } => Some(*status),
            RelayHubEvent::CanRelayFailed { .. } => None,
        })
    }

    /// Build the request `from` would sign for `call`
    pub fn build_request(
        &self,
        from: Pubkey,
        call: &TokenCall,
        transaction_fee: u64,
    ) -> Result<RelayRequest, TokenError> {
        Ok(RelayRequest {
            from,
            call_data: call.encode()?,
            relay: self.relay,
            transaction_fee,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            nonce: self.nonce(&from),
        })
    }

    /// Relay `call` signed by `from` to `recipient`
    pub fn relay_call<R: RelayRecipient>(
        &mut self,
        recipient: &mut R,
        from: Pubkey,
        call: &TokenCall,
        transaction_fee: u64,
    ) -> Result<RelayOutcome, TokenError> {
        let request = self.build_request(from, call, transaction_fee)?;
        self.submit(recipient, &request)
    }

    /// Forward an already built request to `recipient`
    pub fn submit<R: RelayRecipient>(
        &mut self,
        recipient: &mut R,
        request: &RelayRequest,
    ) -> Result<RelayOutcome, TokenError> {
        if recipient.relay_hub() != self.binding.hub {
            return Err(TokenError::Unauthorized);
        }

        let request_id = request.digest()?;

        match recipient.accept_relayed_call(request) {
            RelayDecision::Reject(reason) => {
                info!(
                    "Request {} from {} rejected by recipient: {:?}",
                    request_id, request.from, reason
                );
                self.events.push(RelayHubEvent::CanRelayFailed {
                    request_id,
                    relay: request.relay,
                    from: request.from,
                    reason: reason.code(),
                });
                Ok(RelayOutcome::Rejected { reason: reason.code() })
            }
            RelayDecision::Accept { fee } => {
                debug!("Request {} accepted with fee {}", request_id, fee);

                let execution = recipient.execute_relayed_call(request);
                *self.nonces.entry(request.from).or_insert(0) += 1;

                self.events.push(RelayHubEvent::TransactionRelayed {
                    request_id,
                    relay: request.relay,
                    from: request.from,
                    status: execution.status,
                    charge: execution.fee_charged,
                });
                Ok(RelayOutcome::Relayed {
                    status: execution.status,
                    charge: execution.fee_charged,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee_optimization::RejectReason;
    use crate::relay_hub::RelayExecution;

    /// Recipient that accepts everything and records what it executed
    struct RecordingRecipient {
        hub: Pubkey,
        accept: bool,
        executed: Vec<RelayRequest>,
    }

    impl RelayRecipient for RecordingRecipient {
        fn relay_hub(&self) -> Pubkey {
            self.hub
        }

        fn accept_relayed_call(&self, _request: &RelayRequest) -> RelayDecision {
            if self.accept {
                RelayDecision::Accept { fee: 10 }
            } else {
                RelayDecision::Reject(RejectReason::OperationNotRelayable)
            }
        }

        fn execute_relayed_call(&mut self, request: &RelayRequest) -> RelayExecution {
            self.executed.push(request.clone());
            RelayExecution::succeeded(10)
        }
    }

    fn hub() -> LocalRelayHub {
        LocalRelayHub::new(
            RelayHubBinding {
                hub: Pubkey::new_unique(),
                fee_recipient: Pubkey::new_unique(),
            },
            Pubkey::new_unique(),
        )
    }

    #[test]
    fn test_accepted_request_consumes_nonce() {
        let mut hub = hub();
        let mut recipient = RecordingRecipient {
            hub: hub.binding().hub,
            accept: true,
            executed: vec![],
        };
        let from = Pubkey::new_unique();

        let outcome = hub.relay_call(&mut recipient, from, &TokenCall::TotalSupply, 10).unwrap();
        hub.relay_call(&mut recipient, from, &TokenCall::TotalSupply, 10).unwrap();

        assert!(outcome.succeeded());
        assert_eq!(hub.nonce(&from), 2);
        assert_eq!(recipient.executed[0].nonce, 0);
        assert_eq!(recipient.executed[1].nonce, 1);
        assert_eq!(hub.last_relayed_status(), Some(RelayCallStatus::Ok));
    }

    #[test]
    fn test_rejected_request_is_not_executed() {
        let mut hub = hub();
        let mut recipient = RecordingRecipient {
            hub: hub.binding().hub,
            accept: false,
            executed: vec![],
        };
        let from = Pubkey::new_unique();

        let outcome = hub.relay_call(&mut recipient, from, &TokenCall::TotalSupply, 10).unwrap();

        assert_eq!(outcome, RelayOutcome::Rejected { reason: 11 });
        assert!(recipient.executed.is_empty());
        assert_eq!(hub.nonce(&from), 0, "Rejected requests must not consume a nonce");
        assert!(matches!(hub.events()[0], RelayHubEvent::CanRelayFailed { reason: 11, .. }));
        assert_eq!(hub.last_relayed_status(), None);
    }

    #[test]
    fn test_recipient_bound_to_other_hub() {
        let mut hub = hub();
        let mut recipient = RecordingRecipient {
            hub: Pubkey::new_unique(),
            accept: true,
            executed: vec![],
        };

        assert_eq!(
            hub.relay_call(&mut recipient, Pubkey::new_unique(), &TokenCall::Name, 0),
            Err(TokenError::Unauthorized)
        );
    }
}
