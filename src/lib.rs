// src/lib.rs
//! Gas-station-network token
//!
//! A fungible token whose holders can move funds through a relay hub
//! without holding native currency. Relayed `approve`, `transfer` and
//! `transferFrom` calls pay a flat fee in the token itself to the hub's fee
//! recipient. Every other operation is direct only.
//!
//! - `ledger`: balances, allowances and staged transactions
//! - `roles`: minters, pause, blacklist and role rotation
//! - `fee_optimization`: relay policy, adapter and atomic fee settlement
//! - `relay_hub`: request format, statuses and an in-process hub
//! - `token`: the contract surface tying everything together

pub mod error_handling;
pub mod fee_optimization;
pub mod interfaces;
pub mod ledger;
pub mod relay_hub;
pub mod roles;
pub mod token;
pub mod utils;

pub use error_handling::TokenError;
pub use fee_optimization::{
    CallContext, RejectReason, RelayDecision, RelayHubBinding, RelayMetadata, RelayPolicy,
    RelayableOperation, RELAYED_CALL_ACCEPTED, RELAYED_CALL_REJECTED,
};
pub use interfaces::RelayRecipient;
pub use ledger::Ledger;
pub use relay_hub::{LocalRelayHub, RelayCallStatus, RelayHubEvent, RelayOutcome, RelayRequest};
pub use roles::Role;
pub use token::{CallOutput, Token, TokenCall, TokenEvent, TokenParams};
