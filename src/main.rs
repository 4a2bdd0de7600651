//! Nucleus - demo binary
//!
//! Runs a small deposit / pool / fill / withdraw scenario and prints the
//! resulting balances and state root.
//!
//! ```text
//! nucleus [config.toml]
//! RUST_LOG=nucleus=debug nucleus
//! ```

use alloy_primitives::Address;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nucleus::engine::{CreateLimitOrderPool, FlashSwapParams};
use nucleus::token::TokenContract;
use nucleus::types::{ExchangeRate, Location, LocationArg};
use nucleus::{Nucleus, NucleusConfig};

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => NucleusConfig::from_file(&path)?,
        None => NucleusConfig::default().with_default_fees(3_000, 900),
    };
    info!(address = %config.address, fee_admin = %config.fee_admin, "starting nucleus");
    let mut nucleus = Nucleus::new(config)?;

    let usd = Address::repeat_byte(0x10);
    let eth = Address::repeat_byte(0x20);
    let maker = Address::repeat_byte(0xA1);
    let taker = Address::repeat_byte(0xB0);

    for (token, symbol) in [(usd, "USD"), (eth, "ETH")] {
        let mut contract = TokenContract::standard(symbol);
        for who in [maker, taker] {
            contract.mint(who, 1_000_000);
            contract.approve(who, nucleus.address(), u128::MAX);
        }
        nucleus.deploy_token(token, contract)?;
    }

    // Maker deposits ETH and sells it at 2000 USD, proceeds into the pool
    nucleus.token_transfer_in(maker, eth, 100)?;
    let pool = nucleus.create_limit_order_pool(
        maker,
        CreateLimitOrderPool {
            token_a: eth,
            token_b: usd,
            amount_a: 100,
            exchange_rate: ExchangeRate::new(1, 2_000),
            location_a: LocationArg::InternalCaller,
            location_b: LocationArg::ThisPool,
            receiver: maker,
        },
    )?;
    info!(%pool, "limit pool created");

    // Taker buys 5 ETH straight from their wallet
    nucleus.execute_market_order(
        taker,
        FlashSwapParams {
            pool_id: pool,
            token_a: eth,
            token_b: usd,
            amount_a: 5,
            amount_b: 10_000,
            location_a: LocationArg::ExternalCaller,
            location_b: LocationArg::ExternalCaller,
        },
    )?;

    let view = nucleus.get_limit_order_pool(pool)?;
    info!(
        eth_left = view.amount_a,
        usd_earned = nucleus.token_balance(usd, Location::Pool(pool)),
        fees = nucleus.token_balance(usd, Location::Internal(nucleus.fee_admin())),
        "after fill"
    );

    for event in nucleus.events() {
        info!(?event, "event");
    }
    info!(state_root = %nucleus.state_root_hex(), "done");
    Ok(())
}
