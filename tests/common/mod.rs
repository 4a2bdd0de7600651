//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use alloy_primitives::{address, Address};

use nucleus::engine::{CreateLimitOrderPool, FlashSwapParams};
use nucleus::token::{TokenBehavior, TokenContract};
use nucleus::types::{ExchangeRate, Location, LocationArg, PoolId};
use nucleus::{Nucleus, NucleusConfig};

// ============================================================================
// ACTORS
// ============================================================================

pub const MAKER: Address = address!("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");
pub const TAKER: Address = address!("b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0");
pub const STRANGER: Address = address!("c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5");

pub const TOKEN_A: Address = address!("7070707070707070707070707070707070707070");
pub const TOKEN_B: Address = address!("7171717171717171717171717171717171717171");
pub const TOKEN_C: Address = address!("7272727272727272727272727272727272727272");

/// Wallet balance minted to every actor
pub const MINTED: u128 = 1_000_000;

// ============================================================================
// SETUP
// ============================================================================

/// A Nucleus with standard tokens A, B and C minted to the maker and taker,
/// both of whom approved the Nucleus for everything.
pub fn nucleus() -> Nucleus {
    nucleus_with(NucleusConfig::default())
}

pub fn nucleus_with(config: NucleusConfig) -> Nucleus {
    let mut nucleus = Nucleus::new(config).expect("valid config");
    for token in [TOKEN_A, TOKEN_B, TOKEN_C] {
        deploy(&mut nucleus, token, TokenBehavior::Standard);
    }
    nucleus
}

/// Deploy `token` with `behavior`, minted and approved for maker and taker.
pub fn deploy(nucleus: &mut Nucleus, token: Address, behavior: TokenBehavior) {
    deploy_contract(nucleus, token, TokenContract::new(format!("{token}"), behavior));
}

pub fn deploy_contract(nucleus: &mut Nucleus, token: Address, mut contract: TokenContract) {
    for who in [MAKER, TAKER, STRANGER] {
        contract.mint(who, MINTED);
        contract.approve(who, nucleus.address(), u128::MAX);
    }
    nucleus.deploy_token(token, contract).expect("token deployed");
}

/// Limit pool selling `amount_a` of A for B at `rate`, funded from the
/// maker's internal account, proceeds back into the pool.
pub fn limit_pool(nucleus: &mut Nucleus, amount_a: u128, rate: ExchangeRate) -> PoolId {
    nucleus
        .token_transfer_in(MAKER, TOKEN_A, amount_a)
        .expect("maker deposit");
    nucleus
        .create_limit_order_pool(
            MAKER,
            CreateLimitOrderPool {
                token_a: TOKEN_A,
                token_b: TOKEN_B,
                amount_a,
                exchange_rate: rate,
                location_a: LocationArg::InternalCaller,
                location_b: LocationArg::ThisPool,
                receiver: MAKER,
            },
        )
        .expect("pool created")
}

/// Buy A with B from internal accounts.
pub fn buy(pool_id: PoolId, amount_a: u128, amount_b: u128) -> FlashSwapParams {
    FlashSwapParams {
        pool_id,
        token_a: TOKEN_A,
        token_b: TOKEN_B,
        amount_a,
        amount_b,
        location_a: LocationArg::InternalCaller,
        location_b: LocationArg::InternalCaller,
    }
}

pub fn internal(nucleus: &Nucleus, token: Address, who: Address) -> u128 {
    nucleus.token_balance(token, Location::Internal(who))
}

pub fn external(nucleus: &Nucleus, token: Address, who: Address) -> u128 {
    nucleus.token_balance(token, Location::External(who))
}

pub fn pool(nucleus: &Nucleus, token: Address, pool_id: PoolId) -> u128 {
    nucleus.token_balance(token, Location::Pool(pool_id))
}

/// Ledger total equals the real reserve, for every token.
pub fn assert_conserved(nucleus: &Nucleus, tokens: &[Address]) {
    for token in tokens {
        assert_eq!(
            nucleus.total_ledger_balance(*token),
            nucleus.tokens().balance_of(*token, nucleus.address()),
            "ledger drifted from reserve for {token}"
        );
    }
}
