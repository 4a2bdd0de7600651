//! Entry points of the Nucleus.
//!
//! ## Design Principles
//!
//! 1. **One primitive**: every balance change goes through the transfer
//!    primitive, the only place ledger balances are checked
//! 2. **Atomic entry points**: any error restores the state from before the call
//! 3. **Explicit caller**: every entry point takes the caller's address
//! 4. **Synchronous callbacks**: flash callees and borrowers are called in
//!    place, with the guard's callback window open
//!
//! ## Entry Points
//!
//! | Operation | Guard entry | Allowed in callback |
//! |-----------|-------------|---------------------|
//! | `token_transfer` (ledger only) | `TokenTransfer` | yes |
//! | `token_transfer` (touches a wallet) | `TokenTransfer` | no |
//! | `create_*_order_pool` | `CreatePool` | no |
//! | `update_*_order_pool` | `UpdatePool` | yes |
//! | `transfer_pool_ownership` | `TransferPoolOwnership` | no |
//! | `execute_market_order` / `execute_flash_swap` | `MarketOrder` | yes |
//! | `flash_loan` | `FlashLoan` | yes |
//! | `set_*_fee*` | `SetFees` | no |
//! | `transfer_fee_admin` | `TransferFeeAdmin` | no |
//! | `multicall` | `Multicall` | no |
//!
//! ## Example
//!
//! ```
//! use alloy_primitives::Address;
//! use nucleus::engine::{CreateLimitOrderPool, FlashSwapParams};
//! use nucleus::token::TokenContract;
//! use nucleus::types::{ExchangeRate, Location, LocationArg};
//! use nucleus::{Nucleus, NucleusConfig};
//!
//! let mut nucleus = Nucleus::new(NucleusConfig::default()).unwrap();
//! let (usd, eth) = (Address::repeat_byte(0x10), Address::repeat_byte(0x20));
//! let (maker, taker) = (Address::repeat_byte(0xA1), Address::repeat_byte(0xB0));
//! for token in [usd, eth] {
//!     let mut contract = TokenContract::standard("TKN");
//!     for who in [maker, taker] {
//!         contract.mint(who, 1_000_000);
//!         contract.approve(who, nucleus.address(), u128::MAX);
//!     }
//!     nucleus.deploy_token(token, contract).unwrap();
//! }
//!
//! // sell 10 ETH at 2000 USD each, proceeds back into the pool
//! let pool = nucleus
//!     .create_limit_order_pool(maker, CreateLimitOrderPool {
//!         token_a: eth,
//!         token_b: usd,
//!         amount_a: 10,
//!         exchange_rate: ExchangeRate::new(1, 2_000),
//!         location_a: LocationArg::ExternalCaller,
//!         location_b: LocationArg::ThisPool,
//!         receiver: maker,
//!     })
//!     .unwrap();
//!
//! nucleus
//!     .execute_market_order(taker, FlashSwapParams {
//!         pool_id: pool,
//!         token_a: eth,
//!         token_b: usd,
//!         amount_a: 2,
//!         amount_b: 4_000,
//!         location_a: LocationArg::ExternalCaller,
//!         location_b: LocationArg::ExternalCaller,
//!     })
//!     .unwrap();
//!
//! assert_eq!(nucleus.token_balance(eth, Location::Pool(pool)), 8);
//! assert_eq!(nucleus.token_balance(usd, Location::Pool(pool)), 4_000);
//! ```

mod batch;
mod callee;
mod fee_ops;
mod flash_loan;
mod flash_swap;
mod nucleus;
mod pool_ops;
mod transfer;

pub use batch::{Call, CallOutput};
pub use callee::{
    flash_loan_ack, flash_swap_ack, CallbackContract, FlashLoanCallback, FlashSwapCallback,
};
pub use flash_swap::FlashSwapParams;
pub use nucleus::Nucleus;
pub use pool_ops::CreateLimitOrderPool;
