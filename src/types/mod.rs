//! Core data types for the Nucleus
//!
//! ## Types
//!
//! - [`Location`] / [`LocationArg`]: where value lives, and how callers name it
//! - [`PoolId`] / [`PoolType`]: type-tagged pool identifiers
//! - [`ExchangeRate`]: integer `amount_a : amount_b` rates
//! - [`TradeRequest`]: a directed standing offer as seen by takers
//! - [`Event`]: domain events
//! - [`BatchReceipt`]: batch execution summary
//!
//! ## Amounts
//!
//! All token amounts are raw `u128` in the token's smallest unit. Products
//! (rate and fee math) are taken in `U256`.

mod event;
mod exchange_rate;
mod location;
mod pool_id;
mod receipt;
mod trade_request;

pub use event::Event;
pub use exchange_rate::ExchangeRate;
pub use location::{
    Location, LocationArg, ResolveContext, TAG_EXTERNAL, TAG_EXTERNAL_CALLER, TAG_INTERNAL,
    TAG_INTERNAL_CALLER, TAG_POOL, TAG_THIS_POOL,
};
pub use pool_id::{PoolId, PoolType, POOL_ID_RADIX};
pub use receipt::BatchReceipt;
pub use trade_request::{TradeRequest, TradeRequestConfig};
