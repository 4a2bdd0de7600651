//! The Nucleus world value.
//!
//! ## Transactions
//!
//! Every mutating entry point runs through [`Nucleus::transact`]:
//!
//! 1. acquire the reentrancy guard for its [`Entry`]
//! 2. snapshot the transactional [`State`]
//! 3. run the operation
//! 4. on `Err`, restore the snapshot
//! 5. release the guard
//!
//! The guard is released on every path. Token contracts, the ledger, pools,
//! fee tables and the event log all live in `State`, so a failure anywhere
//! in a call tree leaves no trace.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use tracing::warn;

use crate::config::NucleusConfig;
use crate::engine::CallbackContract;
use crate::error::{NucleusError, Result};
use crate::fees::{FeeEngine, FeeRecord};
use crate::guard::{Entry, GuardState, ReentrancyGuard};
use crate::ledger::TokenLedger;
use crate::pools::{PoolKind, PoolRegistry};
use crate::token::{TokenBank, TokenContract};
use crate::types::{BatchReceipt, Event, Location, PoolId};

/// Everything rolled back when an operation fails.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub(crate) ledger: TokenLedger,
    pub(crate) pools: PoolRegistry,
    pub(crate) fees: FeeEngine,
    pub(crate) fee_admin: Address,
    pub(crate) tokens: TokenBank,
    pub(crate) events: Vec<Event>,
}

/// The custodial exchange ledger.
///
/// ## Example
///
/// ```
/// use alloy_primitives::Address;
/// use nucleus::token::TokenContract;
/// use nucleus::types::Location;
/// use nucleus::{Nucleus, NucleusConfig};
///
/// let mut nucleus = Nucleus::new(NucleusConfig::default()).unwrap();
/// let token = Address::repeat_byte(0x70);
/// let alice = Address::repeat_byte(0xA1);
///
/// let mut contract = TokenContract::standard("TKA");
/// contract.mint(alice, 1_000);
/// contract.approve(alice, nucleus.address(), u128::MAX);
/// nucleus.deploy_token(token, contract).unwrap();
///
/// nucleus.token_transfer_in(alice, token, 400).unwrap();
/// assert_eq!(nucleus.token_balance(token, Location::Internal(alice)), 400);
/// assert_eq!(nucleus.token_balance(token, Location::External(alice)), 600);
/// ```
pub struct Nucleus {
    pub(crate) address: Address,
    pub(crate) state: State,
    pub(crate) guard: ReentrancyGuard,
    pub(crate) contracts: HashMap<Address, Arc<dyn CallbackContract>>,
}

impl fmt::Debug for Nucleus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Nucleus")
            .field("address", &self.address)
            .field("state", &self.state)
            .field("guard", &self.guard)
            .field("contracts", &self.contracts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Nucleus {
    /// Build an empty Nucleus with the configured wildcard fees.
    ///
    /// Wildcard fees are paid to the admin's internal account.
    pub fn new(config: NucleusConfig) -> Result<Self> {
        config.validate()?;
        let receiver = Location::Internal(config.fee_admin);
        let fees = FeeEngine::new(
            FeeRecord::new(config.default_swap_fee_ppm, receiver),
            FeeRecord::new(config.default_flash_loan_fee_ppm, receiver),
        );
        Ok(Self {
            address: config.address,
            state: State {
                ledger: TokenLedger::new(),
                pools: PoolRegistry::new(),
                fees,
                fee_admin: config.fee_admin,
                tokens: TokenBank::new(),
                events: Vec::new(),
            },
            guard: ReentrancyGuard::new(),
            contracts: HashMap::new(),
        })
    }

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    // ========================================================================
    // Environment
    // ========================================================================

    /// Deploy a token contract at `address`.
    pub fn deploy_token(&mut self, address: Address, contract: TokenContract) -> Result<()> {
        self.ensure_host()?;
        self.state.tokens.deploy(address, contract);
        Ok(())
    }

    /// Deploy a callback contract at `address`.
    pub fn deploy_contract(
        &mut self,
        address: Address,
        contract: Arc<dyn CallbackContract>,
    ) -> Result<()> {
        self.ensure_host()?;
        self.contracts.insert(address, contract);
        Ok(())
    }

    pub fn tokens(&self) -> &TokenBank {
        &self.state.tokens
    }

    /// Direct access to token contracts, for minting and setup.
    pub fn tokens_mut(&mut self) -> Result<&mut TokenBank> {
        self.ensure_host()?;
        Ok(&mut self.state.tokens)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Balance at any location. External balances are read from the token.
    pub fn token_balance(&self, token: Address, location: Location) -> u128 {
        match location {
            Location::External(holder) => self.state.tokens.balance_of(token, holder),
            _ => self.state.ledger.balance(token, location),
        }
    }

    /// Sum of internal and pool balances of `token`.
    pub fn total_ledger_balance(&self, token: Address) -> u128 {
        self.state.ledger.total_held(token)
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.state.ledger
    }

    pub fn pool_count(&self) -> usize {
        self.state.pools.len()
    }

    pub fn owner_of(&self, pool_id: PoolId) -> Result<Address> {
        self.state.pools.owner_of(pool_id)
    }

    pub fn pools_owned_by(&self, owner: Address) -> Vec<PoolId> {
        self.state.pools.owned_by(owner)
    }

    pub fn fee_admin(&self) -> Address {
        self.state.fee_admin
    }

    pub fn reentrancy_guard_state(&self) -> GuardState {
        self.guard.state()
    }

    pub fn events(&self) -> &[Event] {
        &self.state.events
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Result<Vec<Event>> {
        self.ensure_host()?;
        Ok(std::mem::take(&mut self.state.events))
    }

    // ========================================================================
    // State root
    // ========================================================================

    /// SHA-256 over a canonical encoding of the ledger, pools and fee tables.
    pub fn state_root(&self) -> [u8; 32] {
        let mut buf = Vec::new();

        for ((token, location), amount) in self.state.ledger.entries() {
            buf.extend_from_slice(token.as_slice());
            buf.extend_from_slice(location.encode().as_slice());
            buf.extend_from_slice(&amount.to_be_bytes());
        }

        for pool in self.state.pools.iter() {
            buf.extend_from_slice(&pool.id.get().to_be_bytes());
            buf.extend_from_slice(pool.owner.as_slice());
            match &pool.kind {
                PoolKind::Limit(limit) => {
                    buf.extend_from_slice(limit.token_a.as_slice());
                    buf.extend_from_slice(limit.token_b.as_slice());
                    buf.extend_from_slice(limit.request.exchange_rate.encode().as_slice());
                    buf.extend_from_slice(limit.request.location_b.encode().as_slice());
                }
                PoolKind::Grid(grid) => {
                    for token in grid.tokens() {
                        buf.extend_from_slice(token.as_slice());
                    }
                    for (a, b) in grid.pairs() {
                        if let Some(request) = grid.request(a, b) {
                            buf.extend_from_slice(a.as_slice());
                            buf.extend_from_slice(b.as_slice());
                            buf.extend_from_slice(request.exchange_rate.encode().as_slice());
                            buf.extend_from_slice(request.location_b.encode().as_slice());
                        }
                    }
                }
            }
        }

        buf.extend_from_slice(self.state.fee_admin.as_slice());
        for ((a, b), record) in self.state.fees.swap_entries() {
            buf.extend_from_slice(a.as_slice());
            buf.extend_from_slice(b.as_slice());
            buf.extend_from_slice(&record.fee_ppm.to_be_bytes());
            buf.extend_from_slice(record.receiver.encode().as_slice());
        }
        for (token, record) in self.state.fees.flash_loan_entries() {
            buf.extend_from_slice(token.as_slice());
            buf.extend_from_slice(&record.fee_ppm.to_be_bytes());
            buf.extend_from_slice(record.receiver.encode().as_slice());
        }

        BatchReceipt::compute_hash(&buf)
    }

    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root())
    }

    // ========================================================================
    // Transaction plumbing
    // ========================================================================

    /// Run `op` under the guard as one atomic transaction.
    pub(crate) fn transact<T>(
        &mut self,
        entry: Entry,
        op: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let previous = self.guard.acquire(entry)?;
        let snapshot = self.state.clone();
        let result = op(self);
        if let Err(err) = &result {
            warn!(?entry, error = %err, "operation rolled back");
            self.state = snapshot;
        }
        self.guard.release(previous);
        result
    }

    /// Run a callback with the guard's callback window open.
    pub(crate) fn with_callback_window<T>(
        &mut self,
        call: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let previous = self.guard.open_callback_window();
        let result = call(self);
        self.guard.close_callback_window(previous);
        result
    }

    /// Environment mutators are for the host only: never from inside an
    /// operation, a hook or a callback.
    fn ensure_host(&self) -> Result<()> {
        match self.guard.state() {
            GuardState::Enterable => Ok(()),
            _ => Err(NucleusError::ReentrancyGuardLocked),
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.state.events.push(event);
    }

    /// Tokens may be neither the zero address nor the Nucleus.
    pub(crate) fn validate_token(&self, token: Address) -> Result<()> {
        if token.is_zero() || token == self.address {
            return Err(NucleusError::InvalidToken(token));
        }
        Ok(())
    }

    /// Recipients of ownership or admin rights.
    pub(crate) fn validate_account(&self, account: Address) -> Result<()> {
        Location::Internal(account).validate(self.address)
    }

    pub(crate) fn callback_target(&self, address: Address) -> Result<Arc<dyn CallbackContract>> {
        self.contracts
            .get(&address)
            .cloned()
            .ok_or(NucleusError::CallbackTargetMissing(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExchangeRate, LocationArg};

    fn setup() -> (Nucleus, Address, Address) {
        let mut nucleus = Nucleus::new(NucleusConfig::default()).unwrap();
        let token = Address::repeat_byte(0x70);
        let alice = Address::repeat_byte(0xA1);
        let mut contract = TokenContract::standard("TKA");
        contract.mint(alice, 1_000);
        contract.approve(alice, nucleus.address(), u128::MAX);
        nucleus.deploy_token(token, contract).unwrap();
        (nucleus, token, alice)
    }

    #[test]
    fn test_new_installs_wildcards() {
        let config = NucleusConfig::default().with_default_fees(2_000, 900);
        let admin = config.fee_admin;
        let nucleus = Nucleus::new(config).unwrap();
        let any = Address::repeat_byte(0x42);
        assert_eq!(
            nucleus.swap_fee(any, any),
            FeeRecord::new(2_000, Location::Internal(admin))
        );
        assert_eq!(nucleus.flash_loan_fee(any).fee_ppm, 900);
        assert_eq!(nucleus.reentrancy_guard_state(), GuardState::Enterable);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = NucleusConfig::new(Address::ZERO, Address::repeat_byte(1));
        assert!(matches!(Nucleus::new(config), Err(NucleusError::Config(_))));
    }

    #[test]
    fn test_failed_transaction_restores_state() {
        let (mut nucleus, token, alice) = setup();
        nucleus.token_transfer_in(alice, token, 100).unwrap();
        let root = nucleus.state_root();
        let events = nucleus.events().len();

        let err = nucleus.transact(Entry::CreatePool, |n| {
            n.move_tokens(
                token,
                60,
                Location::Internal(alice),
                Location::Internal(Address::repeat_byte(0xB0)),
            )?;
            Err::<(), _>(NucleusError::reverted("late failure"))
        });
        assert_eq!(err, Err(NucleusError::reverted("late failure")));
        assert_eq!(nucleus.state_root(), root);
        assert_eq!(nucleus.events().len(), events);
        assert_eq!(nucleus.reentrancy_guard_state(), GuardState::Enterable);
    }

    #[test]
    fn test_state_root_tracks_changes() {
        let (mut nucleus, token, alice) = setup();
        let empty = nucleus.state_root();
        nucleus.token_transfer_in(alice, token, 1).unwrap();
        let funded = nucleus.state_root();
        assert_ne!(empty, funded);

        nucleus
            .create_limit_order_pool(
                alice,
                crate::engine::CreateLimitOrderPool {
                    token_a: token,
                    token_b: Address::repeat_byte(0x71),
                    amount_a: 1,
                    exchange_rate: ExchangeRate::new(1, 1),
                    location_a: LocationArg::InternalCaller,
                    location_b: LocationArg::ThisPool,
                    receiver: alice,
                },
            )
            .unwrap();
        assert_ne!(nucleus.state_root(), funded);
        assert_eq!(nucleus.state_root_hex().len(), 64);
    }

    #[test]
    fn test_take_events_drains() {
        let (mut nucleus, token, alice) = setup();
        nucleus.token_transfer_in(alice, token, 1).unwrap();
        assert_eq!(nucleus.take_events().unwrap().len(), 1);
        assert!(nucleus.events().is_empty());
    }

    #[test]
    fn test_environment_is_host_only() {
        let (mut nucleus, token, _) = setup();
        nucleus.token_transfer_in(Address::repeat_byte(0xA1), token, 1).unwrap();

        let previous = nucleus.guard.acquire(Entry::MarketOrder).unwrap();
        let window = nucleus.guard.open_callback_window();
        assert_eq!(
            nucleus.tokens_mut().err(),
            Some(NucleusError::ReentrancyGuardLocked)
        );
        assert_eq!(nucleus.take_events(), Err(NucleusError::ReentrancyGuardLocked));
        assert_eq!(
            nucleus.deploy_token(token, TokenContract::standard("EVIL")),
            Err(NucleusError::ReentrancyGuardLocked)
        );
        nucleus.guard.close_callback_window(window);
        nucleus.guard.release(previous);

        assert_eq!(nucleus.events().len(), 1);
        assert!(nucleus.tokens_mut().is_ok());
    }
}
