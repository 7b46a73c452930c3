// src/relay_hub/mod.rs
//! Relay hub boundary
//!
//! Requests as the hub forwards them, the statuses it reports, and an
//! in-process hub that drives recipients end to end.

pub mod local_hub;
pub mod relay_request;

pub use local_hub::{LocalRelayHub, RelayHubEvent, RelayOutcome, DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE};
pub use relay_request::{RelayCallStatus, RelayExecution, RelayRequest};
