// src/token/config.rs
//! Initialization parameters of the token

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error_handling::{handle_error_with_message, TokenError};
use crate::utils::pubkey_str;

/// Largest supported number of decimal places
pub const MAX_DECIMALS: u8 = 18;

/// Parameters accepted once by `Token::initialize`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    /// Fiat currency the token tracks, e.g. "NGN"
    pub currency: String,
    pub decimals: u8,
    #[serde(with = "pubkey_str")]
    pub master_minter: Pubkey,
    #[serde(with = "pubkey_str")]
    pub pauser: Pubkey,
    #[serde(with = "pubkey_str")]
    pub blacklister: Pubkey,
    #[serde(with = "pubkey_str")]
    pub owner: Pubkey,
    /// Fixed fee in token units charged per relayed call
    pub gsn_fee: u64,
    /// Supply credited to `owner` at initialization
    pub initial_supply: u64,
}

impl TokenParams {
    /// Parse parameters from JSON, identities given as base58 strings
    pub fn from_json(json: &str) -> Result<Self, TokenError> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| handle_error_with_message(TokenError::InvalidConfiguration, &e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), TokenError> {
        if self.name.trim().is_empty() || self.symbol.trim().is_empty() {
            return Err(handle_error_with_message(
                TokenError::InvalidConfiguration,
                "name and symbol must not be empty",
            ));
        }

        if self.decimals > MAX_DECIMALS {
            return Err(handle_error_with_message(
                TokenError::InvalidConfiguration,
                "too many decimals",
            ));
        }

        let roles = [self.master_minter, self.pauser, self.blacklister, self.owner];
        if roles.iter().any(|role| *role == Pubkey::default()) {
            return Err(handle_error_with_message(
                TokenError::InvalidAddress,
                "role holders must be set",
            ));
        }

        Ok(())
    }
}
