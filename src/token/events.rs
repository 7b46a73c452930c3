// src/token/events.rs
//! Events recorded by the token once a call commits

use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::roles::Role;

/// State changes observable by off-chain consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenEvent {
    Transfer { from: Pubkey, to: Pubkey, amount: u64 },
    Approval { owner: Pubkey, spender: Pubkey, amount: u64 },
    Mint { minter: Pubkey, to: Pubkey, amount: u64 },
    Burn { burner: Pubkey, amount: u64 },
    MinterConfigured { minter: Pubkey, allowance: u64 },
    MinterRemoved { minter: Pubkey },
    Pause,
    Unpause,
    Blacklisted { account: Pubkey },
    UnBlacklisted { account: Pubkey },
    RoleChanged { role: Role, holder: Pubkey },
    /// Relay fee moved from the effective caller to the hub's fee recipient
    GsnFeeCharged { payer: Pubkey, beneficiary: Pubkey, fee: u64 },
}
