//! Pool lifecycle and views.

use alloy_primitives::Address;
use tracing::debug;

use crate::engine::Nucleus;
use crate::error::{NucleusError, Result};
use crate::guard::Entry;
use crate::pools::{
    GridOrderPool, GridOrderPoolView, GridTradeRequest, LimitOrderPool, LimitOrderPoolView,
    PoolKind, TokenSource,
};
use crate::types::{
    Event, ExchangeRate, Location, LocationArg, PoolId, PoolType, ResolveContext, TradeRequest,
    TradeRequestConfig,
};

/// Arguments of [`Nucleus::create_limit_order_pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateLimitOrderPool {
    pub token_a: Address,
    pub token_b: Address,
    /// Initial funding in tokenA
    pub amount_a: u128,
    pub exchange_rate: ExchangeRate,
    /// Where the funding is pulled from
    pub location_a: LocationArg,
    /// Where fill proceeds go; `ThisPool` routes them back into the pool
    pub location_b: LocationArg,
    /// Owner of the new pool
    pub receiver: Address,
}

impl Nucleus {
    // ========================================================================
    // Limit pools
    // ========================================================================

    pub fn create_limit_order_pool(
        &mut self,
        caller: Address,
        params: CreateLimitOrderPool,
    ) -> Result<PoolId> {
        self.transact(Entry::CreatePool, |n| {
            n.validate_pair(params.token_a, params.token_b)?;
            n.validate_account(params.receiver)?;

            let pool_id = n.state.pools.next_id(PoolType::Limit);
            let ctx = ResolveContext::with_pool(caller, pool_id);
            let location_a = params.location_a.resolve(&ctx, n.address)?;
            let location_b = params.location_b.resolve(&ctx, n.address)?;

            let request = TradeRequestConfig {
                exchange_rate: params.exchange_rate,
                location_b,
            };
            let kind = PoolKind::Limit(LimitOrderPool {
                token_a: params.token_a,
                token_b: params.token_b,
                request,
            });
            let pool_id = n.register_pool(params.receiver, kind);
            n.ensure_destination(location_b)?;

            n.authorize(caller, location_a)?;
            n.move_tokens(params.token_a, params.amount_a, location_a, Location::Pool(pool_id))?;
            n.emit_request_updated(pool_id, params.token_a, params.token_b, request);
            Ok(pool_id)
        })
    }

    /// Replace the pool's rate and proceeds location. Moves no tokens.
    pub fn update_limit_order_pool(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        exchange_rate: ExchangeRate,
        location_b: LocationArg,
    ) -> Result<()> {
        self.transact(Entry::UpdatePool, |n| {
            n.state.pools.ensure_owner(pool_id, caller)?.as_limit()?;
            let ctx = ResolveContext::with_pool(caller, pool_id);
            let location_b = location_b.resolve(&ctx, n.address)?;
            n.ensure_destination(location_b)?;

            let request = TradeRequestConfig {
                exchange_rate,
                location_b,
            };
            let limit = n.state.pools.get_mut(pool_id)?.as_limit_mut()?;
            limit.request = request;
            let (token_a, token_b) = (limit.token_a, limit.token_b);
            n.emit_request_updated(pool_id, token_a, token_b, request);
            Ok(())
        })
    }

    pub fn get_limit_order_pool(&self, pool_id: PoolId) -> Result<LimitOrderPoolView> {
        let pool = self.state.pools.get(pool_id)?;
        let limit = pool.as_limit()?;
        Ok(LimitOrderPoolView {
            pool_id,
            owner: pool.owner,
            token_a: limit.token_a,
            token_b: limit.token_b,
            amount_a: self.state.ledger.balance(limit.token_a, Location::Pool(pool_id)),
            exchange_rate: limit.request.exchange_rate,
            location_b: limit.request.location_b,
        })
    }

    // ========================================================================
    // Grid pools
    // ========================================================================

    pub fn create_grid_order_pool(
        &mut self,
        caller: Address,
        token_sources: &[TokenSource],
        trade_requests: &[GridTradeRequest],
        receiver: Address,
    ) -> Result<PoolId> {
        self.transact(Entry::CreatePool, |n| {
            n.validate_account(receiver)?;
            let pool_id = n.register_pool(receiver, PoolKind::Grid(GridOrderPool::new()));
            n.apply_grid_changes(caller, pool_id, token_sources, trade_requests)?;
            Ok(pool_id)
        })
    }

    /// Add funding and replace trade requests of a grid pool.
    pub fn update_grid_order_pool(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        token_sources: &[TokenSource],
        trade_requests: &[GridTradeRequest],
    ) -> Result<()> {
        self.transact(Entry::UpdatePool, |n| {
            n.state.pools.ensure_owner(pool_id, caller)?.as_grid()?;
            n.apply_grid_changes(caller, pool_id, token_sources, trade_requests)
        })
    }

    pub fn get_grid_order_pool(&self, pool_id: PoolId) -> Result<GridOrderPoolView> {
        let pool = self.state.pools.get(pool_id)?;
        let grid = pool.as_grid()?;
        let location = Location::Pool(pool_id);
        let balances = grid
            .tokens()
            .iter()
            .map(|token| (*token, self.state.ledger.balance(*token, location)))
            .collect();
        let trade_requests = grid
            .pairs()
            .map(|(a, b)| {
                TradeRequest::new(a, b, self.state.ledger.balance(a, location), grid.request(a, b))
            })
            .collect();
        Ok(GridOrderPoolView {
            pool_id,
            owner: pool.owner,
            balances,
            trade_requests,
        })
    }

    fn apply_grid_changes(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        token_sources: &[TokenSource],
        trade_requests: &[GridTradeRequest],
    ) -> Result<()> {
        let ctx = ResolveContext::with_pool(caller, pool_id);

        for source in token_sources {
            self.validate_token(source.token)?;
            self.state.pools.get_mut(pool_id)?.as_grid_mut()?.add_token(source.token)?;
            let location = source.location.resolve(&ctx, self.address)?;
            self.authorize(caller, location)?;
            self.move_tokens(source.token, source.amount, location, Location::Pool(pool_id))?;
        }

        for request in trade_requests {
            self.validate_pair(request.token_a, request.token_b)?;
            let location_b = request.location_b.resolve(&ctx, self.address)?;
            self.ensure_destination(location_b)?;
            let config = TradeRequestConfig {
                exchange_rate: request.exchange_rate,
                location_b,
            };
            self.state
                .pools
                .get_mut(pool_id)?
                .as_grid_mut()?
                .set_request(request.token_a, request.token_b, config)?;
            self.emit_request_updated(pool_id, request.token_a, request.token_b, config);
        }
        Ok(())
    }

    // ========================================================================
    // Shared
    // ========================================================================

    /// The directed offer `token_a -> token_b` of a pool.
    ///
    /// The amount is always the pool's ledger balance of `token_a`. A pair
    /// without a configured request, including the reverse direction of a
    /// limit pool, is reported with a null rate and no proceeds location.
    pub fn get_trade_request(
        &self,
        pool_id: PoolId,
        token_a: Address,
        token_b: Address,
    ) -> Result<TradeRequest> {
        let pool = self.state.pools.get(pool_id)?;
        let amount_a = self.state.ledger.balance(token_a, Location::Pool(pool_id));
        Ok(TradeRequest::new(token_a, token_b, amount_a, pool.request(token_a, token_b)))
    }

    /// Hand a pool to a new owner. Balances and requests are untouched.
    pub fn transfer_pool_ownership(
        &mut self,
        caller: Address,
        pool_id: PoolId,
        to: Address,
    ) -> Result<()> {
        self.transact(Entry::TransferPoolOwnership, |n| {
            n.state.pools.ensure_owner(pool_id, caller)?;
            n.validate_account(to)?;
            let from = n.state.pools.set_owner(pool_id, to)?;
            debug!(%pool_id, %from, %to, "pool ownership transferred");
            n.emit(Event::PoolOwnershipTransferred { pool_id, from, to });
            Ok(())
        })
    }

    fn register_pool(&mut self, owner: Address, kind: PoolKind) -> PoolId {
        let pool_type = kind.pool_type();
        let pool_id = self.state.pools.insert(owner, kind);
        debug!(%pool_id, ?pool_type, %owner, "pool created");
        self.emit(Event::PoolCreated {
            pool_id,
            pool_type,
            owner,
        });
        pool_id
    }

    fn validate_pair(&self, token_a: Address, token_b: Address) -> Result<()> {
        self.validate_token(token_a)?;
        self.validate_token(token_b)?;
        if token_a == token_b {
            return Err(NucleusError::IdenticalTokens(token_a));
        }
        Ok(())
    }

    fn emit_request_updated(
        &mut self,
        pool_id: PoolId,
        token_a: Address,
        token_b: Address,
        config: TradeRequestConfig,
    ) {
        debug!(
            %pool_id,
            %token_a,
            %token_b,
            rate_a = config.exchange_rate.amount_a,
            rate_b = config.exchange_rate.amount_b,
            location_b = %config.location_b,
            "trade request updated"
        );
        self.emit(Event::TradeRequestUpdated {
            pool_id,
            token_a,
            token_b,
            exchange_rate: config.exchange_rate,
            location_b: config.location_b,
        });
    }
}
