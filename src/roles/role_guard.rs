// src/roles/role_guard.rs
//! Role-based authorization for privileged token operations
//!
//! Role holders are explicit fields of the initialized token. Authorization
//! checks are pure predicates over the caller and the current assignment;
//! the mutating helpers below only run after those checks pass.

use std::collections::{HashMap, HashSet};

use borsh::{BorshDeserialize, BorshSerialize};
use log::info;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;

use crate::error_handling::{require, TokenError};

/// Privileged roles of the token
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub enum Role {
    /// Rotates the other roles
    Owner,
    /// Configures minters and their allowances
    MasterMinter,
    /// Pauses and unpauses the token
    Pauser,
    /// Adds and removes blacklisted accounts
    Blacklister,
}

/// Current holder of every role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignments {
    pub owner: Pubkey,
    pub master_minter: Pubkey,
    pub pauser: Pubkey,
    pub blacklister: Pubkey,
}

impl RoleAssignments {
    /// Account currently holding `role`
    pub fn holder(&self, role: Role) -> Pubkey {
        match role {
            Role::Owner => self.owner,
            Role::MasterMinter => self.master_minter,
            Role::Pauser => self.pauser,
            Role::Blacklister => self.blacklister,
        }
    }

    pub fn has_role(&self, role: Role, caller: &Pubkey) -> bool {
        self.holder(role) == *caller
    }

    /// Fail with `Unauthorized` unless `caller` holds `role`
    pub fn require_role(&self, role: Role, caller: &Pubkey) -> Result<(), TokenError> {
        require(self.has_role(role, caller), TokenError::Unauthorized)
    }

    fn assign(&mut self, role: Role, holder: Pubkey) {
        match role {
            Role::Owner => self.owner = holder,
            Role::MasterMinter => self.master_minter = holder,
            Role::Pauser => self.pauser = holder,
            Role::Blacklister => self.blacklister = holder,
        }
    }
}

/// Minter registry, pause flag and blacklist guarded by the role holders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGuard {
    /// Role holders
    pub roles: RoleAssignments,
    /// Remaining mint allowance by minter
    minters: HashMap<Pubkey, u64>,
    /// Accounts barred from moving or receiving tokens
    blacklist: HashSet<Pubkey>,
    /// Whether token movements are suspended
    paused: bool,
}

impl RoleGuard {
    pub fn new(roles: RoleAssignments) -> Self {
        Self {
            roles,
            minters: HashMap::new(),
            blacklist: HashSet::new(),
            paused: false,
        }
    }

    pub fn is_minter(&self, account: &Pubkey) -> bool {
        self.minters.contains_key(account)
    }

    /// Remaining amount `minter` may mint, zero for non-minters
    pub fn minter_allowance(&self, minter: &Pubkey) -> u64 {
        self.minters.get(minter).copied().unwrap_or(0)
    }

    /// Register `minter` with a fresh mint allowance
    pub fn configure_minter(
        &mut self,
        caller: &Pubkey,
        minter: &Pubkey,
        allowance: u64,
    ) -> Result<(), TokenError> {
        self.roles.require_role(Role::MasterMinter, caller)?;
        require(*minter != Pubkey::default(), TokenError::InvalidAddress)?;

        self.minters.insert(*minter, allowance);
        info!("Minter {} configured with allowance {}", minter, allowance);
        Ok(())
    }

    /// Revoke `minter`; returns whether it was registered
    pub fn remove_minter(&mut self, caller: &Pubkey, minter: &Pubkey) -> Result<bool, TokenError> {
        self.roles.require_role(Role::MasterMinter, caller)?;

        let removed = self.minters.remove(minter).is_some();
        if removed {
            info!("Minter {} removed", minter);
        }
        Ok(removed)
    }

    /// Remaining allowance after `minter` mints `amount`, without applying it
    pub fn check_mint(&self, minter: &Pubkey, amount: u64) -> Result<u64, TokenError> {
        let allowance = self
            .minters
            .get(minter)
            .copied()
            .ok_or(TokenError::Unauthorized)?;

        allowance
            .checked_sub(amount)
            .ok_or(TokenError::MinterAllowanceExceeded)
    }

    /// Record the allowance left after a committed mint
    pub(crate) fn set_minter_allowance(&mut self, minter: &Pubkey, remaining: u64) {
        if let Some(allowance) = self.minters.get_mut(minter) {
            *allowance = remaining;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn require_not_paused(&self) -> Result<(), TokenError> {
        require(!self.paused, TokenError::Paused)
    }

    pub fn pause(&mut self, caller: &Pubkey) -> Result<(), TokenError> {
        self.roles.require_role(Role::Pauser, caller)?;
        self.paused = true;
        info!("Token paused by {}", caller);
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Pubkey) -> Result<(), TokenError> {
        self.roles.require_role(Role::Pauser, caller)?;
        self.paused = false;
        info!("Token unpaused by {}", caller);
        Ok(())
    }

    pub fn is_blacklisted(&self, account: &Pubkey) -> bool {
        self.blacklist.contains(account)
    }

    /// Fail with `Blacklisted` if any of `accounts` is blacklisted
    pub fn require_not_blacklisted(&self, accounts: &[&Pubkey]) -> Result<(), TokenError> {
        require(
            accounts.iter().all(|account| !self.is_blacklisted(account)),
            TokenError::Blacklisted,
        )
    }

    pub fn blacklist(&mut self, caller: &Pubkey, account: &Pubkey) -> Result<(), TokenError> {
        self.roles.require_role(Role::Blacklister, caller)?;
        self.blacklist.insert(*account);
        info!("Account {} blacklisted", account);
        Ok(())
    }

    pub fn un_blacklist(&mut self, caller: &Pubkey, account: &Pubkey) -> Result<(), TokenError> {
        self.roles.require_role(Role::Blacklister, caller)?;
        self.blacklist.remove(account);
        info!("Account {} removed from blacklist", account);
        Ok(())
    }

    /// Hand `role` over to `new_holder`. Only the owner rotates roles,
    /// including ownership itself.
    pub fn update_role(
        &mut self,
        caller: &Pubkey,
        role: Role,
        new_holder: &Pubkey,
    ) -> Result<(), TokenError> {
        self.roles.require_role(Role::Owner, caller)?;
        require(*new_holder != Pubkey::default(), TokenError::InvalidAddress)?;

        self.roles.assign(role, *new_holder);
        info!("Role {:?} assigned to {}", role, new_holder);
        Ok(())
    }
}
