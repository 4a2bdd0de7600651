//! # Nucleus
//!
//! Custodial exchange ledger: one component holds pooled token reserves for
//! many users, and lets them post standing offers that others fill
//! atomically, optionally funding the fill with the offer's own output
//! (flash swaps) or with a flash loan.
//!
//! ## Architecture
//!
//! - **Types**: locations, pool ids, exchange rates, trade requests, events
//! - **Ledger**: per-token, per-location balances
//! - **Pools**: limit and grid pools over the ledger
//! - **Fees**: swap and flash loan fee tables with wildcard fallback
//! - **Guard**: the reentrancy guard and its callback allow-list
//! - **Token**: the fungible token collaborators the Nucleus calls
//! - **Engine**: the [`Nucleus`] itself and every entry point
//!
//! ## Design Principles
//!
//! 1. **Conservation**: for every token, internal plus pool balances equal
//!    the Nucleus's real token balance after every operation
//! 2. **Integer Math**: amounts are `u128`, products are taken in `U256`
//! 3. **Atomicity**: an operation either completes or leaves no trace
//! 4. **Synchronous Execution**: callbacks run in place, never concurrently

// ============================================================================
// Module declarations
// ============================================================================

/// Configuration loading and validation
pub mod config;

/// Entry points and the Nucleus world value
pub mod engine;

/// Error types
pub mod error;

/// Fee tables
pub mod fees;

/// Reentrancy guard
pub mod guard;

/// Token ledger
pub mod ledger;

/// Pools and their registry
pub mod pools;

/// Fungible token collaborators
pub mod token;

/// Core data types
pub mod types;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{ConfigError, NucleusConfig};
pub use engine::{
    Call, CallOutput, CallbackContract, CreateLimitOrderPool, FlashLoanCallback, FlashSwapCallback,
    FlashSwapParams, Nucleus,
};
pub use error::{NucleusError, Result};
pub use types::{BatchReceipt, Event, ExchangeRate, Location, LocationArg, PoolId, PoolType};
