// src/roles/mod.rs
//! Owner, master minter, pauser and blacklister authorization

pub mod role_guard;

pub use role_guard::{Role, RoleAssignments, RoleGuard};
