//! Market orders and flash swaps.
//!
//! ## Fill Sequence
//!
//! ```text
//! 1. pool exists, request configured
//! 2. resolve locations, reject self trades, authorize location_b
//! 3. amounts agree with the rate, amount_a within capacity
//! 4. pool --amount_a--> location_a
//! 5. callee runs (flash swaps only), guard in callback window
//! 6. location_b --fee--> fee receiver
//!    location_b --amount_b - fee--> proceeds location
//! ```
//!
//! The pool is debited before the callee runs, so anything the callee does
//! sees the post-debit state. Only the original caller's authority over
//! `location_b` counts; a callee never pays on the caller's behalf.

use alloy_primitives::{Address, Bytes};
use tracing::debug;

use crate::engine::{flash_swap_ack, FlashSwapCallback, Nucleus};
use crate::error::{NucleusError, Result};
use crate::guard::Entry;
use crate::types::{Event, Location, LocationArg, PoolId, ResolveContext};

/// Fill parameters shared by market orders and flash swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashSwapParams {
    pub pool_id: PoolId,
    /// Token bought from the pool
    pub token_a: Address,
    /// Token paid to the pool
    pub token_b: Address,
    pub amount_a: u128,
    /// Gross payment, fee included
    pub amount_b: u128,
    /// Where tokenA is delivered
    pub location_a: LocationArg,
    /// Where tokenB is pulled from
    pub location_b: LocationArg,
}

impl Nucleus {
    /// Fill a trade request with no callback.
    pub fn execute_market_order(&mut self, caller: Address, params: FlashSwapParams) -> Result<()> {
        self.transact(Entry::MarketOrder, |n| n.fill(caller, params, None, Bytes::new()))
    }

    /// Fill a trade request, calling `callee` between delivery and payment.
    ///
    /// With `callee == None` this is a market order. Zero amounts are
    /// valid and only trigger the callback.
    pub fn execute_flash_swap(
        &mut self,
        caller: Address,
        params: FlashSwapParams,
        callee: Option<Address>,
        data: Bytes,
    ) -> Result<()> {
        self.transact(Entry::MarketOrder, |n| n.fill(caller, params, callee, data))
    }

    fn fill(
        &mut self,
        caller: Address,
        params: FlashSwapParams,
        callee: Option<Address>,
        data: Bytes,
    ) -> Result<()> {
        let FlashSwapParams {
            pool_id,
            token_a,
            token_b,
            amount_a,
            amount_b,
            ..
        } = params;

        let request = self
            .state
            .pools
            .get(pool_id)?
            .request(token_a, token_b)
            .ok_or(NucleusError::TradeRequestNotConfigured {
                pool_id,
                token_a,
                token_b,
            })?;

        let ctx = ResolveContext::with_pool(caller, pool_id);
        let location_a = params.location_a.resolve(&ctx, self.address)?;
        let location_b = params.location_b.resolve(&ctx, self.address)?;
        let pool = Location::Pool(pool_id);
        if location_a == pool || location_b == pool {
            return Err(NucleusError::SelfTrade);
        }
        self.authorize(caller, location_b)?;

        if !request.exchange_rate.accepts(amount_a, amount_b) {
            return Err(NucleusError::ExchangeRateDisagreement);
        }
        let available = self.state.ledger.balance(token_a, pool);
        if amount_a > available {
            return Err(NucleusError::InsufficientCapacity {
                available,
                requested: amount_a,
            });
        }

        self.move_tokens(token_a, amount_a, pool, location_a)?;

        if let Some(callee) = callee {
            let contract = self.callback_target(callee)?;
            let call = FlashSwapCallback {
                initiator: caller,
                callee,
                pool_id,
                token_a,
                token_b,
                amount_a,
                amount_b,
                location_a,
                location_b,
                data,
            };
            let ack = self.with_callback_window(|n| contract.on_flash_swap(n, &call))?;
            if ack != flash_swap_ack() {
                return Err(NucleusError::InvalidCallbackAcknowledgement);
            }
        }

        let fee = self.state.fees.swap_fee(token_a, token_b);
        let fee_amount = fee.fee_on(amount_b);
        let net = amount_b - fee_amount;
        if fee_amount > 0 {
            self.move_tokens(token_b, fee_amount, location_b, fee.receiver)?;
        }
        self.move_tokens(token_b, net, location_b, request.location_b)?;

        debug!(
            %pool_id,
            %token_a,
            %token_b,
            amount_a,
            amount_b,
            fee = fee_amount,
            "market order executed"
        );
        self.emit(Event::MarketOrderExecuted {
            pool_id,
            token_a,
            token_b,
            amount_a,
            amount_b,
            amount_b_to_pool: net,
        });
        Ok(())
    }
}
