//! Pool state.
//!
//! A pool's balances are not stored here: they live in the ledger under
//! `Location::Pool(id)`. A pool only records which tokens it trades and its
//! trade request configurations.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::error::{NucleusError, Result};
use crate::types::{ExchangeRate, LocationArg, PoolId, PoolType, TradeRequestConfig};

/// Maximum number of distinct tokens in a grid pool
pub const MAX_GRID_TOKENS: usize = 20;

// ============================================================================
// Creation inputs
// ============================================================================

/// Funding pulled into a grid pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSource {
    pub token: Address,
    pub amount: u128,
    pub location: LocationArg,
}

/// A directed offer to install on a grid pool.
///
/// A null rate clears the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTradeRequest {
    pub token_a: Address,
    pub token_b: Address,
    pub exchange_rate: ExchangeRate,
    pub location_b: LocationArg,
}

// ============================================================================
// Pool variants
// ============================================================================

/// Single-pair pool selling `token_a` for `token_b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderPool {
    pub token_a: Address,
    pub token_b: Address,
    pub request: TradeRequestConfig,
}

/// Multi-token pool with a directed offer for every ordered pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridOrderPool {
    /// In order of first appearance
    tokens: Vec<Address>,
    requests: HashMap<(Address, Address), TradeRequestConfig>,
}

impl GridOrderPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Address] {
        &self.tokens
    }

    pub fn contains(&self, token: Address) -> bool {
        self.tokens.contains(&token)
    }

    /// Add `token` to the pool's token set.
    pub fn add_token(&mut self, token: Address) -> Result<()> {
        if self.contains(token) {
            return Ok(());
        }
        if self.tokens.len() >= MAX_GRID_TOKENS {
            return Err(NucleusError::GridPoolTokenLimit {
                max: MAX_GRID_TOKENS,
            });
        }
        self.tokens.push(token);
        Ok(())
    }

    /// Install or clear the `token_a -> token_b` request.
    pub fn set_request(
        &mut self,
        token_a: Address,
        token_b: Address,
        config: TradeRequestConfig,
    ) -> Result<()> {
        if token_a == token_b {
            return Err(NucleusError::IdenticalTokens(token_a));
        }
        self.add_token(token_a)?;
        self.add_token(token_b)?;
        if config.exchange_rate.is_null() {
            self.requests.remove(&(token_a, token_b));
        } else {
            self.requests.insert((token_a, token_b), config);
        }
        Ok(())
    }

    pub fn request(&self, token_a: Address, token_b: Address) -> Option<TradeRequestConfig> {
        self.requests.get(&(token_a, token_b)).copied()
    }

    /// Every ordered pair of distinct pool tokens, in token order.
    pub fn pairs(&self) -> impl Iterator<Item = (Address, Address)> + '_ {
        self.tokens.iter().flat_map(move |a| {
            self.tokens
                .iter()
                .filter(move |b| *b != a)
                .map(move |b| (*a, *b))
        })
    }
}

/// Variant-specific pool state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolKind {
    Limit(LimitOrderPool),
    Grid(GridOrderPool),
}

impl PoolKind {
    pub fn pool_type(&self) -> PoolType {
        match self {
            PoolKind::Limit(_) => PoolType::Limit,
            PoolKind::Grid(_) => PoolType::Grid,
        }
    }
}

/// An owned pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    pub id: PoolId,
    pub owner: Address,
    pub kind: PoolKind,
}

impl Pool {
    /// The configured request for the ordered pair, if any.
    pub fn request(&self, token_a: Address, token_b: Address) -> Option<TradeRequestConfig> {
        match &self.kind {
            PoolKind::Limit(limit) if limit.token_a == token_a && limit.token_b == token_b => {
                Some(limit.request).filter(|r| !r.exchange_rate.is_null())
            }
            PoolKind::Limit(_) => None,
            PoolKind::Grid(grid) => grid.request(token_a, token_b),
        }
    }

    /// Tokens the pool trades, in declaration order.
    pub fn tokens(&self) -> Vec<Address> {
        match &self.kind {
            PoolKind::Limit(limit) => vec![limit.token_a, limit.token_b],
            PoolKind::Grid(grid) => grid.tokens().to_vec(),
        }
    }

    pub fn as_limit(&self) -> Result<&LimitOrderPool> {
        match &self.kind {
            PoolKind::Limit(limit) => Ok(limit),
            PoolKind::Grid(_) => Err(NucleusError::NotALimitOrderPool(self.id)),
        }
    }

    pub fn as_limit_mut(&mut self) -> Result<&mut LimitOrderPool> {
        match &mut self.kind {
            PoolKind::Limit(limit) => Ok(limit),
            PoolKind::Grid(_) => Err(NucleusError::NotALimitOrderPool(self.id)),
        }
    }

    pub fn as_grid(&self) -> Result<&GridOrderPool> {
        match &self.kind {
            PoolKind::Grid(grid) => Ok(grid),
            PoolKind::Limit(_) => Err(NucleusError::NotAGridOrderPool(self.id)),
        }
    }

    pub fn as_grid_mut(&mut self) -> Result<&mut GridOrderPool> {
        match &mut self.kind {
            PoolKind::Grid(grid) => Ok(grid),
            PoolKind::Limit(_) => Err(NucleusError::NotAGridOrderPool(self.id)),
        }
    }
}
