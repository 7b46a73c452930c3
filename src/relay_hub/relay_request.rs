// src/relay_hub/relay_request.rs
//! Relay requests and the statuses reported back to the hub

use borsh::{BorshDeserialize, BorshSerialize};
use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::error_handling::{handle_error_with_message, TokenError};
use crate::fee_optimization::RelayMetadata;
use crate::utils::sha256_hex;

/// A meta-transaction as the hub forwards it to a recipient
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RelayRequest {
    /// Account that signed the meta-transaction
    pub from: Pubkey,
    /// Borsh-encoded `TokenCall`
    pub call_data: Vec<u8>,
    /// Relay worker submitting the request
    pub relay: Pubkey,
    /// Fee the relay asks for
    pub transaction_fee: u64,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Hub nonce of `from`
    pub nonce: u64,
}

impl RelayRequest {
    /// Metadata attached to the forwarded call
    pub fn metadata(&self) -> RelayMetadata {
        RelayMetadata {
            from: self.from,
            relay: self.relay,
            transaction_fee: self.transaction_fee,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            nonce: self.nonce,
        }
    }

    /// Request id: hex SHA-256 of the Borsh encoding
    pub fn digest(&self) -> Result<String, TokenError> {
        let bytes = self
            .try_to_vec()
            .map_err(|e| handle_error_with_message(TokenError::SerializationError, &e.to_string()))?;
        Ok(sha256_hex(&bytes))
    }
}

/// Status of an accepted relayed call, as reported in `TransactionRelayed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelayCallStatus {
    /// Operation committed and the fee was charged
    Ok,
    /// Operation failed; nothing was committed and no fee was charged
    RelayedCallFailed,
}

impl RelayCallStatus {
    pub fn code(self) -> u64 {
        match self {
            RelayCallStatus::Ok => 0,
            RelayCallStatus::RelayedCallFailed => 1,
        }
    }
}

/// What the recipient reports after executing an accepted call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayExecution {
    pub status: RelayCallStatus,
    /// Fee actually moved to the hub's fee recipient
    pub fee_charged: u64,
}

impl RelayExecution {
    pub fn succeeded(fee_charged: u64) -> Self {
        Self {
            status: RelayCallStatus::Ok,
            fee_charged,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: RelayCallStatus::RelayedCallFailed,
            fee_charged: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(nonce: u64) -> RelayRequest {
        RelayRequest {
            from: Pubkey::new_unique(),
            call_data: vec![5],
            relay: Pubkey::new_unique(),
            transaction_fee: 10,
            gas_price: 1,
            gas_limit: 100_000,
            nonce,
        }
    }

    #[test]
    fn test_digest_depends_on_nonce() {
        let first = request(0);
        let mut second = first.clone();
        second.nonce = 1;

        let digest = first.digest().unwrap();
        assert_eq!(digest.len(), 64, "SHA-256 hex digest expected");
        assert_eq!(digest, first.digest().unwrap(), "Digest must be deterministic");
        assert_ne!(digest, second.digest().unwrap());
    }

    #[test]
    fn test_metadata_carries_sender() {
        let req = request(3);
        let metadata = req.metadata();

        assert_eq!(metadata.from, req.from);
        assert_eq!(metadata.nonce, 3);
        assert_eq!(metadata.transaction_fee, 10);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(RelayCallStatus::Ok.code(), 0);
        assert_eq!(RelayCallStatus::RelayedCallFailed.code(), 1);
        assert_eq!(RelayExecution::failed().fee_charged, 0);
    }
}
