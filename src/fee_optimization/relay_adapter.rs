// src/fee_optimization/relay_adapter.rs
//! Direct/relayed call routing
//!
//! A call is relayed when it arrives from the bound relay hub carrying relay
//! metadata. The true initiator is then the metadata's `from`, not the
//! immediate caller. Anything else is a direct call by the immediate caller.

use borsh::{BorshDeserialize, BorshSerialize};
use log::debug;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error_handling::TokenError;
use crate::token::TokenCall;
use crate::utils::pubkey_str;

/// Relay hub trusted by the token and the account that collects relay fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayHubBinding {
    /// Identity the hub calls from
    #[serde(with = "pubkey_str")]
    pub hub: Pubkey,
    /// Beneficiary of every relay fee
    #[serde(with = "pubkey_str")]
    pub fee_recipient: Pubkey,
}

/// Metadata the relay hub attaches to a forwarded call
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RelayMetadata {
    /// Account that signed the meta-transaction
    pub from: Pubkey,
    /// Relay worker that submitted it
    pub relay: Pubkey,
    /// Fee the relay asked for
    pub transaction_fee: u64,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Hub nonce of `from`
    pub nonce: u64,
}

/// Raw call as it reaches the token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Immediate caller
    pub caller: Pubkey,
    /// Present when the call was forwarded by a relay hub
    pub relay: Option<RelayMetadata>,
    /// Borsh-encoded `TokenCall`
    pub call_data: Vec<u8>,
}

impl CallContext {
    /// Direct call by `caller`
    pub fn direct(caller: Pubkey, call: &TokenCall) -> Result<Self, TokenError> {
        Ok(Self {
            caller,
            relay: None,
            call_data: call.encode()?,
        })
    }

    /// Call forwarded by `hub` on behalf of `metadata.from`
    pub fn relayed(hub: Pubkey, metadata: RelayMetadata, call_data: Vec<u8>) -> Self {
        Self {
            caller: hub,
            relay: Some(metadata),
            call_data,
        }
    }
}

/// Call after routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCall {
    /// Account on whose behalf the call runs
    pub effective_caller: Pubkey,
    pub is_relayed: bool,
    pub call: TokenCall,
    /// Fee the relay proposed, zero for direct calls
    pub proposed_fee: u64,
}

/// Distinguishes relayed from direct calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayAdapter {
    relay_hub: Pubkey,
}

impl RelayAdapter {
    pub fn new(relay_hub: Pubkey) -> Self {
        Self { relay_hub }
    }

    pub fn relay_hub(&self) -> Pubkey {
        self.relay_hub
    }

    /// Resolve the effective caller and decode the call. Pure routing.
    pub fn normalize(&self, ctx: &CallContext) -> Result<NormalizedCall, TokenError> {
        let call = TokenCall::decode(&ctx.call_data)?;

        match &ctx.relay {
            Some(metadata) if ctx.caller == self.relay_hub => Ok(NormalizedCall {
                effective_caller: metadata.from,
                is_relayed: true,
                call,
                proposed_fee: metadata.transaction_fee,
            }),
            Some(_) => {
                debug!(
                    "Ignoring relay metadata on {} from {}: caller is not the relay hub",
                    call.name(),
                    ctx.caller
                );
                Ok(NormalizedCall {
                    effective_caller: ctx.caller,
                    is_relayed: false,
                    call,
                    proposed_fee: 0,
                })
            }
            None => Ok(NormalizedCall {
                effective_caller: ctx.caller,
                is_relayed: false,
                call,
                proposed_fee: 0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(from: Pubkey) -> RelayMetadata {
        RelayMetadata {
            from,
            relay: Pubkey::new_unique(),
            transaction_fee: 10,
            gas_price: 1,
            gas_limit: 1_000_000,
            nonce: 0,
        }
    }

    #[test]
    fn test_relayed_call_uses_metadata_sender() {
        let hub = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let adapter = RelayAdapter::new(hub);
        let data = TokenCall::TotalSupply.encode().unwrap();

        let normalized = adapter
            .normalize(&CallContext::relayed(hub, metadata(user), data))
            .unwrap();

        assert!(normalized.is_relayed);
        assert_eq!(normalized.effective_caller, user);
        assert_eq!(normalized.call, TokenCall::TotalSupply);
        assert_eq!(normalized.proposed_fee, 10);
    }

    #[test]
    fn test_metadata_from_non_hub_is_ignored() {
        let hub = Pubkey::new_unique();
        let impostor = Pubkey::new_unique();
        let victim = Pubkey::new_unique();
        let adapter = RelayAdapter::new(hub);
        let data = TokenCall::Approve { spender: impostor, amount: 1 }.encode().unwrap();

        let normalized = adapter
            .normalize(&CallContext::relayed(impostor, metadata(victim), data))
            .unwrap();

        assert!(!normalized.is_relayed);
        assert_eq!(normalized.effective_caller, impostor, "Impostor must not act as victim");
    }

    #[test]
    fn test_direct_call() {
        let hub = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let adapter = RelayAdapter::new(hub);

        let ctx = CallContext::direct(user, &TokenCall::Name).unwrap();
        let normalized = adapter.normalize(&ctx).unwrap();

        assert!(!normalized.is_relayed);
        assert_eq!(normalized.effective_caller, user);
        assert_eq!(normalized.proposed_fee, 0);
    }

    #[test]
    fn test_hub_without_metadata_is_direct() {
        let hub = Pubkey::new_unique();
        let adapter = RelayAdapter::new(hub);

        let ctx = CallContext::direct(hub, &TokenCall::TotalSupply).unwrap();
        let normalized = adapter.normalize(&ctx).unwrap();

        assert!(!normalized.is_relayed);
        assert_eq!(normalized.effective_caller, hub);
    }

    #[test]
    fn test_undecodable_call_data() {
        let hub = Pubkey::new_unique();
        let adapter = RelayAdapter::new(hub);
        let ctx = CallContext {
            caller: hub,
            relay: Some(metadata(Pubkey::new_unique())),
            call_data: vec![250, 1, 2],
        };

        assert_eq!(adapter.normalize(&ctx), Err(TokenError::UnknownOperation));
    }
}
