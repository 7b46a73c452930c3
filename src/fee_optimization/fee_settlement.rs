// src/fee_optimization/fee_settlement.rs
//! Atomic execution of relayed calls
//!
//! A relayed call runs in three steps against one staged ledger
//! transaction: re-check solvency on current state, apply the operation,
//! move the fee to the relay beneficiary. The transaction commits only if
//! every step succeeds, so the fee is never charged for an operation that
//! did not happen.

use log::{debug, info, warn};
use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::error_handling::TokenError;
use crate::fee_optimization::relay_policy::{ensure_covers, RelayableOperation};
use crate::ledger::{Ledger, LedgerTransaction};
use crate::roles::RoleGuard;
use crate::token::{TokenCall, TokenEvent};

/// Result of a committed relayed call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementReceipt {
    /// Operation that was applied
    pub operation: RelayableOperation,
    /// Account the fee was taken from
    pub payer: Pubkey,
    /// Fee moved to the beneficiary
    pub fee_charged: u64,
    /// Relay hub fee recipient
    pub beneficiary: Pubkey,
    /// Events produced by the call, in order
    pub events: Vec<TokenEvent>,
}

/// Apply one relay-eligible operation on behalf of `caller`.
///
/// Shared by the direct and the relayed path; neither pause nor blacklist
/// state is bypassed for relayed calls.
pub fn apply_operation(
    tx: &mut LedgerTransaction<'_>,
    guard: &RoleGuard,
    caller: &Pubkey,
    operation: &RelayableOperation,
) -> Result<TokenEvent, TokenError> {
    guard.require_not_paused()?;

    match *operation {
        RelayableOperation::Transfer { to, amount } => {
            guard.require_not_blacklisted(&[caller, &to])?;
            tx.transfer(caller, &to, amount)?;
            Ok(TokenEvent::Transfer { from: *caller, to, amount })
        }
        RelayableOperation::Approve { spender, amount } => {
            guard.require_not_blacklisted(&[caller, &spender])?;
            tx.approve(caller, &spender, amount);
            Ok(TokenEvent::Approval { owner: *caller, spender, amount })
        }
        RelayableOperation::TransferFrom { from, to, amount } => {
            guard.require_not_blacklisted(&[caller, &from, &to])?;
            tx.spend_allowance(&from, caller, amount)?;
            tx.transfer(&from, &to, amount)?;
            Ok(TokenEvent::Transfer { from, to, amount })
        }
    }
}

/// Execute a relayed `call` for `caller`, charging `fee` to `beneficiary`.
///
/// On error nothing has been written to `ledger`.
pub fn execute(
    ledger: &mut Ledger,
    guard: &RoleGuard,
    caller: &Pubkey,
    call: &TokenCall,
    fee: u64,
    beneficiary: &Pubkey,
) -> Result<SettlementReceipt, TokenError> {
    // Only whitelisted operations may reach settlement
    let operation = call.relayable().ok_or_else(|| {
        warn!("Relayed {} reached settlement without being relayable", call.name());
        TokenError::UnknownOperation
    })?;

    // State may have moved since the acceptance check
    ensure_covers(&operation, caller, ledger.balance_of(caller), fee)
        .map_err(|reason| reason.as_error())?;

    let mut tx = ledger.begin();

    let operation_event = apply_operation(&mut tx, guard, caller, &operation).map_err(|e| {
        info!("Relayed {} from {} failed: {}", operation.name(), caller, e);
        e
    })?;

    let mut events = vec![operation_event];
    if fee > 0 {
        tx.transfer(caller, beneficiary, fee).map_err(|e| {
            info!("Relay fee of {} from {} could not be settled: {}", fee, caller, e);
            e
        })?;
        events.push(TokenEvent::GsnFeeCharged {
            payer: *caller,
            beneficiary: *beneficiary,
            fee,
        });
    }

    tx.commit();
    debug!(
        "Relayed {} from {} settled with fee {} to {}",
        operation.name(),
        caller,
        fee,
        beneficiary
    );

    Ok(SettlementReceipt {
        operation,
        payer: *caller,
        fee_charged: fee,
        beneficiary: *beneficiary,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleAssignments;

    const GSN_FEE: u64 = 10;

    struct Fixture {
        ledger: Ledger,
        guard: RoleGuard,
        admin: Pubkey,
        beneficiary: Pubkey,
    }

    fn fixture() -> Fixture {
        let admin = Pubkey::new_unique();
        Fixture {
            ledger: Ledger::new(),
            guard: RoleGuard::new(RoleAssignments {
                owner: admin,
                master_minter: admin,
                pauser: admin,
                blacklister: admin,
            }),
            admin,
            beneficiary: Pubkey::new_unique(),
        }
    }

    fn fund(ledger: &mut Ledger, account: &Pubkey, amount: u64) {
        let mut tx = ledger.begin();
        tx.mint(account, amount).unwrap();
        tx.commit();
    }

    #[test]
    fn test_transfer_settles_amount_and_fee() {
        let mut f = fixture();
        let sender = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        fund(&mut f.ledger, &sender, 5_000);

        let call = TokenCall::Transfer { to: recipient, amount: 4_990 };
        let receipt = execute(&mut f.ledger, &f.guard, &sender, &call, GSN_FEE, &f.beneficiary)
            .unwrap();

        assert_eq!(receipt.fee_charged, GSN_FEE);
        assert_eq!(receipt.events.len(), 2, "Operation and fee events expected");
        assert_eq!(f.ledger.balance_of(&sender), 0);
        assert_eq!(f.ledger.balance_of(&recipient), 4_990);
        assert_eq!(f.ledger.balance_of(&f.beneficiary), GSN_FEE);
        assert_eq!(f.ledger.total_supply(), 5_000, "Fees must not create tokens");
    }

    #[test]
    fn test_revalidates_solvency_at_execution() {
        let mut f = fixture();
        let sender = Pubkey::new_unique();
        fund(&mut f.ledger, &sender, 100);
        let snapshot = f.ledger.clone();

        let call = TokenCall::Transfer { to: Pubkey::new_unique(), amount: 91 };
        assert_eq!(
            execute(&mut f.ledger, &f.guard, &sender, &call, GSN_FEE, &f.beneficiary),
            Err(TokenError::InsufficientBalanceForFee)
        );
        assert_eq!(f.ledger, snapshot);
    }

    #[test]
    fn test_failed_transfer_from_charges_no_fee() {
        let mut f = fixture();
        let owner = Pubkey::new_unique();
        let spender = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        fund(&mut f.ledger, &owner, 1_000);
        fund(&mut f.ledger, &spender, 50);

        let mut tx = f.ledger.begin();
        tx.approve(&owner, &spender, 100);
        tx.commit();
        let snapshot = f.ledger.clone();

        let call = TokenCall::TransferFrom { from: owner, to, amount: 101 };
        assert_eq!(
            execute(&mut f.ledger, &f.guard, &spender, &call, GSN_FEE, &f.beneficiary),
            Err(TokenError::InsufficientAllowance)
        );
        assert_eq!(f.ledger, snapshot, "Fee must not be charged when the operation fails");
    }

    #[test]
    fn test_transfer_from_within_allowance() {
        let mut f = fixture();
        let owner = Pubkey::new_unique();
        let spender = Pubkey::new_unique();
        let to = Pubkey::new_unique();
        fund(&mut f.ledger, &owner, 1_000);
        fund(&mut f.ledger, &spender, GSN_FEE);

        let mut tx = f.ledger.begin();
        tx.approve(&owner, &spender, 300);
        tx.commit();

        let call = TokenCall::TransferFrom { from: owner, to, amount: 300 };
        execute(&mut f.ledger, &f.guard, &spender, &call, GSN_FEE, &f.beneficiary).unwrap();

        assert_eq!(f.ledger.balance_of(&owner), 700);
        assert_eq!(f.ledger.balance_of(&to), 300);
        assert_eq!(f.ledger.balance_of(&spender), 0, "Spender pays the fee");
        assert_eq!(f.ledger.allowance(&owner, &spender), 0);
    }

    #[test]
    fn test_non_relayable_call_is_unknown_operation() {
        let mut f = fixture();
        let caller = Pubkey::new_unique();
        fund(&mut f.ledger, &caller, 1_000);

        assert_eq!(
            execute(&mut f.ledger, &f.guard, &caller, &TokenCall::TotalSupply, GSN_FEE, &f.beneficiary),
            Err(TokenError::UnknownOperation)
        );
    }

    #[test]
    fn test_paused_token_charges_no_fee() {
        let mut f = fixture();
        let sender = Pubkey::new_unique();
        fund(&mut f.ledger, &sender, 1_000);
        f.guard.pause(&f.admin).unwrap();
        let snapshot = f.ledger.clone();

        let call = TokenCall::Approve { spender: Pubkey::new_unique(), amount: 1 };
        assert_eq!(
            execute(&mut f.ledger, &f.guard, &sender, &call, GSN_FEE, &f.beneficiary),
            Err(TokenError::Paused)
        );
        assert_eq!(f.ledger, snapshot);
    }

    #[test]
    fn test_fee_overflowing_beneficiary_rolls_back_operation() {
        let mut f = fixture();
        let sender = Pubkey::new_unique();
        let spender = Pubkey::new_unique();
        let beneficiary = f.beneficiary;

        // Credit directly: minting this much would overflow the supply first
        let mut tx = f.ledger.begin();
        tx.credit(&beneficiary, u64::MAX).unwrap();
        tx.credit(&sender, GSN_FEE).unwrap();
        tx.commit();
        let snapshot = f.ledger.clone();

        let call = TokenCall::Approve { spender, amount: 500 };
        assert_eq!(
            execute(&mut f.ledger, &f.guard, &sender, &call, GSN_FEE, &beneficiary),
            Err(TokenError::ArithmeticOverflow)
        );
        assert_eq!(f.ledger, snapshot);
        assert_eq!(f.ledger.allowance(&sender, &spender), 0, "Approval must be rolled back");
    }
}
