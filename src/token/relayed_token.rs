// src/token/relayed_token.rs
//! Token contract with relayed-call support
//!
//! `Token` combines the ledger, the role guard and the relay pipeline.
//! Direct calls run under ordinary ledger rules and never pay a fee.
//! Calls forwarded by the bound relay hub go through the relay policy and
//! are settled atomically together with the relay fee.

use log::{debug, info};
use solana_program::pubkey::Pubkey;

use crate::error_handling::{require, TokenError};
use crate::fee_optimization::{
    self, CallContext, NormalizedCall, RelayAdapter, RelayDecision, RelayHubBinding,
    RelayPolicy, RelayableOperation, RejectReason, SettlementReceipt,
};
use crate::interfaces::RelayRecipient;
use crate::ledger::Ledger;
use crate::relay_hub::{RelayExecution, RelayRequest};
use crate::roles::{Role, RoleAssignments, RoleGuard};
use crate::token::{CallOutput, TokenCall, TokenEvent, TokenParams};

/// Descriptive token metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub currency: String,
    pub decimals: u8,
}

/// The token contract
#[derive(Debug, Clone)]
pub struct Token {
    /// Trusted relay hub and its fee recipient
    binding: RelayHubBinding,
    /// Routes calls arriving from the hub
    adapter: RelayAdapter,
    /// Set once by `initialize`
    initialized: bool,
    metadata: TokenMetadata,
    /// Relay whitelist and fee, fixed at initialization
    policy: RelayPolicy,
    guard: RoleGuard,
    ledger: Ledger,
    /// Events of committed calls not yet taken
    events: Vec<TokenEvent>,
}

impl Token {
    /// Deploy an uninitialized token bound to `binding`
    pub fn new(binding: RelayHubBinding) -> Self {
        Token {
            binding,
            adapter: RelayAdapter::new(binding.hub),
            initialized: false,
            metadata: TokenMetadata::default(),
            policy: RelayPolicy::new(0),
            guard: RoleGuard::new(RoleAssignments {
                owner: Pubkey::default(),
                master_minter: Pubkey::default(),
                pauser: Pubkey::default(),
                blacklister: Pubkey::default(),
            }),
            ledger: Ledger::new(),
            events: Vec::new(),
        }
    }

    /// Configure the token. Succeeds exactly once.
    pub fn initialize(&mut self, params: TokenParams) -> Result<(), TokenError> {
        require(!self.initialized, TokenError::AlreadyInitialized)?;
        params.validate()?;

        let mut ledger = Ledger::new();
        if params.initial_supply > 0 {
            let mut tx = ledger.begin();
            tx.mint(&params.owner, params.initial_supply)?;
            tx.commit();
        }

        self.metadata = TokenMetadata {
            name: params.name,
            symbol: params.symbol,
            currency: params.currency,
            decimals: params.decimals,
        };
        self.policy = RelayPolicy::new(params.gsn_fee);
        self.guard = RoleGuard::new(RoleAssignments {
            owner: params.owner,
            master_minter: params.master_minter,
            pauser: params.pauser,
            blacklister: params.blacklister,
        });
        self.ledger = ledger;
        self.initialized = true;

        if params.initial_supply > 0 {
            self.events.push(TokenEvent::Transfer {
                from: Pubkey::default(),
                to: params.owner,
                amount: params.initial_supply,
            });
        }

        info!(
            "Token {} ({}) initialized with relay fee {} and supply {}",
            self.metadata.name,
            self.metadata.symbol,
            params.gsn_fee,
            params.initial_supply
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn require_initialized(&self) -> Result<(), TokenError> {
        require(self.initialized, TokenError::NotInitialized)
    }

    pub fn relay_hub_binding(&self) -> RelayHubBinding {
        self.binding
    }

    // Queries

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn currency(&self) -> &str {
        &self.metadata.currency
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// Fee charged per relayed call
    pub fn gsn_fee(&self) -> u64 {
        self.policy.gsn_fee()
    }

    pub fn balance_of(&self, account: &Pubkey) -> u64 {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
        self.ledger.allowance(owner, spender)
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn roles(&self) -> &RoleAssignments {
        &self.guard.roles
    }

    pub fn is_minter(&self, account: &Pubkey) -> bool {
        self.guard.is_minter(account)
    }

    pub fn minter_allowance(&self, minter: &Pubkey) -> u64 {
        self.guard.minter_allowance(minter)
    }

    pub fn is_paused(&self) -> bool {
        self.guard.is_paused()
    }

    pub fn is_blacklisted(&self, account: &Pubkey) -> bool {
        self.guard.is_blacklisted(account)
    }

    /// Events recorded since the last call to `take_events`
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    // Direct token operations

    pub fn transfer(&mut self, caller: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.apply_direct(caller, RelayableOperation::Transfer { to: *to, amount })
    }

    pub fn approve(
        &mut self,
        caller: &Pubkey,
        spender: &Pubkey,
        amount: u64,
    ) -> Result<(), TokenError> {
        self.apply_direct(caller, RelayableOperation::Approve { spender: *spender, amount })
    }

    /// Move `amount` from `from` to `to` using `caller`'s allowance
    pub fn transfer_from(
        &mut self,
        caller: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<(), TokenError> {
        self.apply_direct(
            caller,
            RelayableOperation::TransferFrom { from: *from, to: *to, amount },
        )
    }

    fn apply_direct(
        &mut self,
        caller: &Pubkey,
        operation: RelayableOperation,
    ) -> Result<(), TokenError> {
        self.require_initialized()?;

        let mut tx = self.ledger.begin();
        let event = fee_optimization::apply_operation(&mut tx, &self.guard, caller, &operation)?;
        tx.commit();

        debug!("Direct {} by {} committed", operation.name(), caller);
        self.events.push(event);
        Ok(())
    }

    // Minting

    pub fn configure_minter(
        &mut self,
        caller: &Pubkey,
        minter: &Pubkey,
        allowance: u64,
    ) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.configure_minter(caller, minter, allowance)?;
        self.events.push(TokenEvent::MinterConfigured { minter: *minter, allowance });
        Ok(())
    }

    pub fn remove_minter(&mut self, caller: &Pubkey, minter: &Pubkey) -> Result<(), TokenError> {
        self.require_initialized()?;
        if self.guard.remove_minter(caller, minter)? {
            self.events.push(TokenEvent::MinterRemoved { minter: *minter });
        }
        Ok(())
    }

    /// Mint `amount` to `to` out of `caller`'s minter allowance
    pub fn mint(&mut self, caller: &Pubkey, to: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.require_not_paused()?;
        require(amount > 0, TokenError::InvalidAmount)?;
        require(*to != Pubkey::default(), TokenError::InvalidAddress)?;
        self.guard.require_not_blacklisted(&[caller, to])?;
        let remaining = self.guard.check_mint(caller, amount)?;

        let mut tx = self.ledger.begin();
        tx.mint(to, amount)?;
        tx.commit();
        self.guard.set_minter_allowance(caller, remaining);

        info!("Minter {} minted {} to {}", caller, amount, to);
        self.events.push(TokenEvent::Mint { minter: *caller, to: *to, amount });
        self.events.push(TokenEvent::Transfer { from: Pubkey::default(), to: *to, amount });
        Ok(())
    }

    /// Burn `amount` of a minter's own balance
    pub fn burn(&mut self, caller: &Pubkey, amount: u64) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.require_not_paused()?;
        require(self.guard.is_minter(caller), TokenError::Unauthorized)?;
        require(amount > 0, TokenError::InvalidAmount)?;
        self.guard.require_not_blacklisted(&[caller])?;

        let mut tx = self.ledger.begin();
        tx.burn(caller, amount)?;
        tx.commit();

        info!("Minter {} burned {}", caller, amount);
        self.events.push(TokenEvent::Burn { burner: *caller, amount });
        self.events.push(TokenEvent::Transfer { from: *caller, to: Pubkey::default(), amount });
        Ok(())
    }

    // Pause, blacklist and role rotation

    pub fn pause(&mut self, caller: &Pubkey) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.pause(caller)?;
        self.events.push(TokenEvent::Pause);
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Pubkey) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.unpause(caller)?;
        self.events.push(TokenEvent::Unpause);
        Ok(())
    }

    pub fn blacklist(&mut self, caller: &Pubkey, account: &Pubkey) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.blacklist(caller, account)?;
        self.events.push(TokenEvent::Blacklisted { account: *account });
        Ok(())
    }

    pub fn un_blacklist(&mut self, caller: &Pubkey, account: &Pubkey) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.un_blacklist(caller, account)?;
        self.events.push(TokenEvent::UnBlacklisted { account: *account });
        Ok(())
    }

    pub fn update_role(
        &mut self,
        caller: &Pubkey,
        role: Role,
        new_holder: &Pubkey,
    ) -> Result<(), TokenError> {
        self.require_initialized()?;
        self.guard.update_role(caller, role, new_holder)?;
        self.events.push(TokenEvent::RoleChanged { role, holder: *new_holder });
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Pubkey, new_owner: &Pubkey) -> Result<(), TokenError> {
        self.update_role(caller, Role::Owner, new_owner)
    }

    pub fn update_master_minter(&mut self, caller: &Pubkey, holder: &Pubkey) -> Result<(), TokenError> {
        self.update_role(caller, Role::MasterMinter, holder)
    }

    pub fn update_pauser(&mut self, caller: &Pubkey, holder: &Pubkey) -> Result<(), TokenError> {
        self.update_role(caller, Role::Pauser, holder)
    }

    pub fn update_blacklister(&mut self, caller: &Pubkey, holder: &Pubkey) -> Result<(), TokenError> {
        self.update_role(caller, Role::Blacklister, holder)
    }

    // Entrypoint

    /// Single entrypoint for encoded calls, direct or forwarded by the hub
    pub fn call(&mut self, ctx: &CallContext) -> Result<CallOutput, TokenError> {
        let normalized = self.adapter.normalize(ctx)?;

        if normalized.is_relayed {
            self.relay(normalized)?;
            Ok(CallOutput::None)
        } else {
            self.dispatch(&normalized.effective_caller, normalized.call)
        }
    }

    /// Accept and settle a relayed call on current state
    fn relay(&mut self, normalized: NormalizedCall) -> Result<SettlementReceipt, TokenError> {
        self.require_initialized()?;

        let caller = normalized.effective_caller;
        let fee = match self.policy.decide(
            &normalized.call,
            &caller,
            normalized.proposed_fee,
            &self.ledger,
        ) {
            RelayDecision::Accept { fee } => fee,
            RelayDecision::Reject(reason) => return Err(reason.as_error()),
        };

        let receipt = fee_optimization::execute(
            &mut self.ledger,
            &self.guard,
            &caller,
            &normalized.call,
            fee,
            &self.binding.fee_recipient,
        )?;

        self.events.extend(receipt.events.iter().cloned());
        Ok(receipt)
    }

    /// Run a decoded call for `caller` without any relay involvement
    pub fn dispatch(&mut self, caller: &Pubkey, call: TokenCall) -> Result<CallOutput, TokenError> {
        let output = match call {
            TokenCall::Transfer { to, amount } => {
                self.transfer(caller, &to, amount)?;
                CallOutput::None
            }
            TokenCall::Approve { spender, amount } => {
                self.approve(caller, &spender, amount)?;
                CallOutput::None
            }
            TokenCall::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, &from, &to, amount)?;
                CallOutput::None
            }
            TokenCall::BalanceOf { account } => CallOutput::Amount(self.balance_of(&account)),
            TokenCall::Allowance { owner, spender } => {
                CallOutput::Amount(self.allowance(&owner, &spender))
            }
            TokenCall::TotalSupply => CallOutput::Amount(self.total_supply()),
            TokenCall::Name => CallOutput::Text(self.metadata.name.clone()),
            TokenCall::Symbol => CallOutput::Text(self.metadata.symbol.clone()),
            TokenCall::Currency => CallOutput::Text(self.metadata.currency.clone()),
            TokenCall::Decimals => CallOutput::Decimals(self.decimals()),
            TokenCall::GsnFee => CallOutput::Amount(self.gsn_fee()),
            TokenCall::Mint { to, amount } => {
                self.mint(caller, &to, amount)?;
                CallOutput::None
            }
            TokenCall::Burn { amount } => {
                self.burn(caller, amount)?;
                CallOutput::None
            }
            TokenCall::ConfigureMinter { minter, allowance } => {
                self.configure_minter(caller, &minter, allowance)?;
                CallOutput::None
            }
            TokenCall::RemoveMinter { minter } => {
                self.remove_minter(caller, &minter)?;
                CallOutput::None
            }
            TokenCall::MinterAllowance { minter } => {
                CallOutput::Amount(self.minter_allowance(&minter))
            }
            TokenCall::IsMinter { account } => CallOutput::Flag(self.is_minter(&account)),
            TokenCall::Pause => {
                self.pause(caller)?;
                CallOutput::None
            }
            TokenCall::Unpause => {
                self.unpause(caller)?;
                CallOutput::None
            }
            TokenCall::Blacklist { account } => {
                self.blacklist(caller, &account)?;
                CallOutput::None
            }
            TokenCall::UnBlacklist { account } => {
                self.un_blacklist(caller, &account)?;
                CallOutput::None
            }
            TokenCall::IsBlacklisted { account } => CallOutput::Flag(self.is_blacklisted(&account)),
            TokenCall::UpdateRole { role, new_holder } => {
                self.update_role(caller, role, &new_holder)?;
                CallOutput::None
            }
        };

        Ok(output)
    }
}

impl RelayRecipient for Token {
    fn relay_hub(&self) -> Pubkey {
        self.binding.hub
    }

    fn accept_relayed_call(&self, request: &RelayRequest) -> RelayDecision {
        match TokenCall::decode(&request.call_data) {
            Ok(call) => self
                .policy
                .decide(&call, &request.from, request.transaction_fee, &self.ledger),
            Err(_) => RelayDecision::Reject(RejectReason::OperationNotRelayable),
        }
    }

    fn execute_relayed_call(&mut self, request: &RelayRequest) -> RelayExecution {
        let ctx = CallContext::relayed(self.binding.hub, request.metadata(), request.call_data.clone());

        match self.adapter.normalize(&ctx).and_then(|normalized| self.relay(normalized)) {
            Ok(receipt) => RelayExecution::succeeded(receipt.fee_charged),
            Err(e) => {
                info!("Relayed call from {} failed: {}", request.from, e);
                RelayExecution::failed()
            }
        }
    }
}
