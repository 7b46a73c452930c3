// src/error_handling/error_types.rs
//! Error types for the relayed-fee token
//!
//! Every fallible operation of the ledger, the role guard and the relay
//! pipeline returns a `TokenError`. Errors are local to a single call: the
//! call that produced one has not committed any state.

use log::warn;
use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Errors raised by token, role and relay operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Relayed call targets an operation outside the relay whitelist
    #[error("Operation cannot be invoked through the relay hub")]
    OperationNotRelayable = 1,

    /// Caller cannot cover the operation amount plus the relay fee
    #[error("Balance does not cover operation amount plus relay fee")]
    InsufficientBalanceForFee = 2,

    /// A balance debit would go below zero
    #[error("Insufficient funds")]
    InsufficientFunds = 3,

    /// Spender allowance is lower than the requested amount
    #[error("Insufficient allowance")]
    InsufficientAllowance = 4,

    /// Balance, allowance or supply update would overflow
    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 5,

    /// Call data does not decode to a known operation, or the operation
    /// reached settlement without being relayable
    #[error("Unknown operation")]
    UnknownOperation = 6,

    /// Caller does not hold the role the operation requires
    #[error("Unauthorized operation")]
    Unauthorized = 7,

    /// Token is paused
    #[error("Token is paused")]
    Paused = 8,

    /// One of the accounts involved is blacklisted
    #[error("Account is blacklisted")]
    Blacklisted = 9,

    /// Minter allowance is lower than the requested mint amount
    #[error("Mint amount exceeds minter allowance")]
    MinterAllowanceExceeded = 10,

    /// `initialize` was already called
    #[error("Token already initialized")]
    AlreadyInitialized = 11,

    /// Operation invoked before `initialize`
    #[error("Token not initialized")]
    NotInitialized = 12,

    /// Amount must be greater than zero
    #[error("Invalid amount")]
    InvalidAmount = 13,

    /// The zero address is not a valid account for this operation
    #[error("Invalid address")]
    InvalidAddress = 14,

    /// Initialization parameters are malformed
    #[error("Invalid configuration")]
    InvalidConfiguration = 15,

    /// Call payload could not be encoded
    #[error("Serialization error")]
    SerializationError = 16,
}

impl TokenError {
    /// Numeric code used when the error crosses a program boundary
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl From<TokenError> for ProgramError {
    fn from(e: TokenError) -> Self {
        ProgramError::Custom(e.code())
    }
}

/// Log an error and hand it back, for use in `map_err` and early returns
pub fn handle_error(error: TokenError) -> TokenError {
    warn!("Token error: {}", error);
    error
}

/// Log an error with extra context and hand it back
pub fn handle_error_with_message(error: TokenError, message: &str) -> TokenError {
    warn!("Token error: {} - {}", error, message);
    error
}

/// Fail with `error` unless `condition` holds
pub fn require(condition: bool, error: TokenError) -> Result<(), TokenError> {
    if !condition {
        Err(handle_error(error))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let program_error: ProgramError = TokenError::InsufficientBalanceForFee.into();

        if let ProgramError::Custom(code) = program_error {
            assert_eq!(code, TokenError::InsufficientBalanceForFee.code());
        } else {
            panic!("TokenError should convert to a custom program error");
        }
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            TokenError::OperationNotRelayable,
            TokenError::InsufficientBalanceForFee,
            TokenError::InsufficientFunds,
            TokenError::InsufficientAllowance,
            TokenError::ArithmeticOverflow,
            TokenError::UnknownOperation,
            TokenError::Unauthorized,
            TokenError::Paused,
            TokenError::Blacklisted,
            TokenError::MinterAllowanceExceeded,
            TokenError::AlreadyInitialized,
            TokenError::NotInitialized,
            TokenError::InvalidAmount,
            TokenError::InvalidAddress,
            TokenError::InvalidConfiguration,
            TokenError::SerializationError,
        ];

        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len(), "Error codes must be unique");
    }

    #[test]
    fn test_require_function() {
        assert!(require(true, TokenError::Unauthorized).is_ok());
        assert_eq!(
            require(false, TokenError::Unauthorized),
            Err(TokenError::Unauthorized)
        );
    }
}
