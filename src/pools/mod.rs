//! Pools and their registry.
//!
//! ## Pool Variants
//!
//! - [`LimitOrderPool`]: sells one token for another at one rate
//! - [`GridOrderPool`]: up to [`MAX_GRID_TOKENS`] tokens with an independent
//!   offer for every ordered pair (`n * (n - 1)` offers)
//!
//! Pools are never destroyed. A drained pool simply has nothing to sell.
//!
//! ## Views
//!
//! [`LimitOrderPoolView`] and [`GridOrderPoolView`] combine a pool's
//! configuration with its ledger balances; they are what the Nucleus
//! query accessors return.

mod pool;
mod registry;

pub use pool::{
    GridOrderPool, GridTradeRequest, LimitOrderPool, Pool, PoolKind, TokenSource, MAX_GRID_TOKENS,
};
pub use registry::PoolRegistry;

use alloy_primitives::Address;

use crate::types::{ExchangeRate, Location, PoolId, TradeRequest};

/// A limit pool as seen by takers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderPoolView {
    pub pool_id: PoolId,
    pub owner: Address,
    pub token_a: Address,
    pub token_b: Address,
    /// Ledger balance of `token_a`
    pub amount_a: u128,
    pub exchange_rate: ExchangeRate,
    pub location_b: Location,
}

/// A grid pool as seen by takers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOrderPoolView {
    pub pool_id: PoolId,
    pub owner: Address,
    /// Every token with its ledger balance
    pub balances: Vec<(Address, u128)>,
    /// One entry per ordered token pair, configured or not
    pub trade_requests: Vec<TradeRequest>,
}

impl GridOrderPoolView {
    pub fn balance(&self, token: Address) -> u128 {
        self.balances
            .iter()
            .find(|(t, _)| *t == token)
            .map_or(0, |(_, b)| *b)
    }

    pub fn trade_request(&self, token_a: Address, token_b: Address) -> Option<&TradeRequest> {
        self.trade_requests
            .iter()
            .find(|r| r.token_a == token_a && r.token_b == token_b)
    }
}
