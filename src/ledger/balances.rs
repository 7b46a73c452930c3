// src/ledger/balances.rs
//! Balance and allowance bookkeeping
//!
//! The ledger only exposes reads directly. Every write goes through a
//! `LedgerTransaction`, which buffers changes until `commit` so that a
//! call either applies all of its mutations or none of them.

use std::collections::HashMap;

use log::debug;
use solana_program::pubkey::Pubkey;

use crate::error_handling::TokenError;

/// Balances, allowances and total supply of the token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Balance by account
    balances: HashMap<Pubkey, u64>,
    /// Allowance by (owner, spender)
    allowances: HashMap<(Pubkey, Pubkey), u64>,
    /// Sum of all balances
    total_supply: u64,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`, zero if it never received tokens
    pub fn balance_of(&self, account: &Pubkey) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Amount `spender` may still move out of `owner`'s balance
    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Total supply in circulation
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Whether `account` has ever been credited
    pub fn has_account(&self, account: &Pubkey) -> bool {
        self.balances.contains_key(account)
    }

    /// Number of known accounts
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    /// Open a staged transaction against this ledger
    pub fn begin(&mut self) -> LedgerTransaction<'_> {
        let total_supply = self.total_supply;
        LedgerTransaction {
            ledger: self,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply,
        }
    }
}

/// Buffered set of ledger writes
///
/// Reads see the buffered writes first and fall back to the ledger.
/// Dropping the transaction without calling `commit` discards every write.
#[derive(Debug)]
pub struct LedgerTransaction<'a> {
    ledger: &'a mut Ledger,
    balances: HashMap<Pubkey, u64>,
    allowances: HashMap<(Pubkey, Pubkey), u64>,
    total_supply: u64,
}

impl<'a> LedgerTransaction<'a> {
    pub fn balance_of(&self, account: &Pubkey) -> u64 {
        self.balances
            .get(account)
            .copied()
            .unwrap_or_else(|| self.ledger.balance_of(account))
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_else(|| self.ledger.allowance(owner, spender))
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Add `amount` to `account`
    pub fn credit(&mut self, account: &Pubkey, amount: u64) -> Result<(), TokenError> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(TokenError::ArithmeticOverflow)?;
        self.balances.insert(*account, balance);
        Ok(())
    }

    /// Remove `amount` from `account`
    pub fn debit(&mut self, account: &Pubkey, amount: u64) -> Result<(), TokenError> {
        let balance = self
            .balance_of(account)
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientFunds)?;
        self.balances.insert(*account, balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Set the allowance of `spender` over `owner`'s balance
    pub fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u64) {
        self.allowances.insert((*owner, *spender), amount);
    }

    /// Consume `amount` of `spender`'s allowance over `owner`
    pub fn spend_allowance(
        &mut self,
        owner: &Pubkey,
        spender: &Pubkey,
        amount: u64,
    ) -> Result<(), TokenError> {
        let remaining = self
            .allowance(owner, spender)
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance)?;
        self.allowances.insert((*owner, *spender), remaining);
        Ok(())
    }

    /// Create `amount` new tokens on `to`
    pub fn mint(&mut self, to: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::ArithmeticOverflow)?;
        self.credit(to, amount)
    }

    /// Destroy `amount` tokens held by `from`
    pub fn burn(&mut self, from: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.debit(from, amount)?;
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Apply every buffered write to the ledger
    pub fn commit(self) {
        debug!(
            "Committing ledger transaction: {} balances, {} allowances",
            self.balances.len(),
            self.allowances.len()
        );

        self.ledger.balances.extend(self.balances);
        self.ledger.allowances.extend(self.allowances);
        self.ledger.total_supply = self.total_supply;
    }
}
