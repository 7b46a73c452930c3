// src/token/instruction.rs
//! Call payloads accepted by the token
//!
//! The relay hub forwards calls as opaque bytes. They are Borsh-encoded
//! `TokenCall` values; direct callers may use the same encoding through
//! `Token::call` or the typed methods on `Token`.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::error_handling::{handle_error_with_message, TokenError};
use crate::fee_optimization::RelayableOperation;
use crate::roles::Role;

/// Every operation the token exposes
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum TokenCall {
    /// Move `amount` from the caller to `to`
    Transfer { to: Pubkey, amount: u64 },

    /// Let `spender` move up to `amount` of the caller's tokens
    Approve { spender: Pubkey, amount: u64 },

    /// Move `amount` from `from` to `to` using the caller's allowance
    TransferFrom { from: Pubkey, to: Pubkey, amount: u64 },

    BalanceOf { account: Pubkey },
    Allowance { owner: Pubkey, spender: Pubkey },
    TotalSupply,
    Name,
    Symbol,
    Currency,
    Decimals,
    GsnFee,

    /// Mint `amount` to `to` from the caller's minter allowance
    Mint { to: Pubkey, amount: u64 },

    /// Burn `amount` of the caller's own tokens (minters only)
    Burn { amount: u64 },

    ConfigureMinter { minter: Pubkey, allowance: u64 },
    RemoveMinter { minter: Pubkey },
    MinterAllowance { minter: Pubkey },
    IsMinter { account: Pubkey },
    Pause,
    Unpause,
    Blacklist { account: Pubkey },
    UnBlacklist { account: Pubkey },
    IsBlacklisted { account: Pubkey },

    /// Hand `role` over to `new_holder` (owner only)
    UpdateRole { role: Role, new_holder: Pubkey },
}

impl TokenCall {
    /// Encode the call as relay payload bytes
    pub fn encode(&self) -> Result<Vec<u8>, TokenError> {
        self.try_to_vec()
            .map_err(|e| handle_error_with_message(TokenError::SerializationError, &e.to_string()))
    }

    /// Decode relay payload bytes
    pub fn decode(input: &[u8]) -> Result<Self, TokenError> {
        Self::try_from_slice(input)
            .map_err(|e| handle_error_with_message(TokenError::UnknownOperation, &e.to_string()))
    }

    /// The relay-eligible form of this call, if it has one.
    ///
    /// Every variant is listed so that adding an operation forces a decision
    /// on whether it may be relayed.
    pub fn relayable(&self) -> Option<RelayableOperation> {
        match *self {
            TokenCall::Transfer { to, amount } => Some(RelayableOperation::Transfer { to, amount }),
            TokenCall::Approve { spender, amount } => {
                Some(RelayableOperation::Approve { spender, amount })
            }
            TokenCall::TransferFrom { from, to, amount } => {
                Some(RelayableOperation::TransferFrom { from, to, amount })
            }
            TokenCall::BalanceOf { .. }
            | TokenCall::Allowance { .. }
            | TokenCall::TotalSupply
            | TokenCall::Name
            | TokenCall::Symbol
            | TokenCall::Currency
            | TokenCall::Decimals
            | TokenCall::GsnFee
            | TokenCall::Mint { .. }
            | TokenCall::Burn { .. }
            | TokenCall::ConfigureMinter { .. }
            | TokenCall::RemoveMinter { .. }
            | TokenCall::MinterAllowance { .. }
            | TokenCall::IsMinter { .. }
            | TokenCall::Pause
            | TokenCall::Unpause
            | TokenCall::Blacklist { .. }
            | TokenCall::UnBlacklist { .. }
            | TokenCall::IsBlacklisted { .. }
            | TokenCall::UpdateRole { .. } => None,
        }
    }

    /// Operation name used in logs and events
    pub fn name(&self) -> &'static str {
        match self {
            TokenCall::Transfer { .. } => "transfer",
            TokenCall::Approve { .. } => "approve",
            TokenCall::TransferFrom { .. } => "transferFrom",
            TokenCall::BalanceOf { .. } => "balanceOf",
            TokenCall::Allowance { .. } => "allowance",
            TokenCall::TotalSupply => "totalSupply",
            TokenCall::Name => "name",
            TokenCall::Symbol => "symbol",
            TokenCall::Currency => "currency",
            TokenCall::Decimals => "decimals",
            TokenCall::GsnFee => "gsnFee",
            TokenCall::Mint { .. } => "mint",
            TokenCall::Burn { .. } => "burn",
            TokenCall::ConfigureMinter { .. } => "configureMinter",
            TokenCall::RemoveMinter { .. } => "removeMinter",
            TokenCall::MinterAllowance { .. } => "minterAllowance",
            TokenCall::IsMinter { .. } => "isMinter",
            TokenCall::Pause => "pause",
            TokenCall::Unpause => "unpause",
            TokenCall::Blacklist { .. } => "blacklist",
            TokenCall::UnBlacklist { .. } => "unBlacklist",
            TokenCall::IsBlacklisted { .. } => "isBlacklisted",
            TokenCall::UpdateRole { .. } => "updateRole",
        }
    }
}

/// Value returned by a call
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CallOutput {
    /// State-changing call without a return value
    None,
    /// Token amount
    Amount(u64),
    /// Yes/no query
    Flag(bool),
    /// Text metadata
    Text(String),
    /// Decimal places
    Decimals(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_garbage_is_unknown_operation() {
        assert_eq!(TokenCall::decode(&[0xff, 0x01]), Err(TokenError::UnknownOperation));
        assert_eq!(TokenCall::decode(&[]), Err(TokenError::UnknownOperation));
    }

    #[test]
    fn test_decode_trailing_bytes_rejected() {
        let mut data = TokenCall::TotalSupply.encode().unwrap();
        data.push(0);
        assert_eq!(TokenCall::decode(&data), Err(TokenError::UnknownOperation));
    }

    #[test]
    fn test_only_three_calls_are_relayable() {
        let account = Pubkey::new_unique();
        let calls = vec![
            TokenCall::Transfer { to: account, amount: 1 },
            TokenCall::Approve { spender: account, amount: 1 },
            TokenCall::TransferFrom { from: account, to: account, amount: 1 },
            TokenCall::BalanceOf { account },
            TokenCall::Allowance { owner: account, spender: account },
            TokenCall::TotalSupply,
            TokenCall::Name,
            TokenCall::Symbol,
            TokenCall::Currency,
            TokenCall::Decimals,
            TokenCall::GsnFee,
            TokenCall::Mint { to: account, amount: 1 },
            TokenCall::Burn { amount: 1 },
            TokenCall::ConfigureMinter { minter: account, allowance: 1 },
            TokenCall::RemoveMinter { minter: account },
            TokenCall::MinterAllowance { minter: account },
            TokenCall::IsMinter { account },
            TokenCall::Pause,
            TokenCall::Unpause,
            TokenCall::Blacklist { account },
            TokenCall::UnBlacklist { account },
            TokenCall::IsBlacklisted { account },
            TokenCall::UpdateRole { role: Role::Pauser, new_holder: account },
        ];

        let relayable: Vec<&str> = calls
            .iter()
            .filter(|call| call.relayable().is_some())
            .map(|call| call.name())
            .collect();

        assert_eq!(relayable, vec!["transfer", "approve", "transferFrom"]);
    }
}
