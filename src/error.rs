//! Error types for the Nucleus.
//!
//! Every failure is a named condition. Any error returned from a mutating
//! entry point means the whole call tree was rolled back.

use alloy_primitives::{Address, Bytes, B256};
use thiserror::Error;

use crate::config::ConfigError;
use crate::types::{Location, PoolId};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NucleusError>;

/// Every condition the Nucleus can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NucleusError {
    // ========================================================================
    // Locations
    // ========================================================================
    /// The location's type tag is not one of the known variants
    #[error("invalid location type tag {0:#04x}")]
    InvalidLocationType(u8),

    /// Padding bytes of an encoded location are not zero
    #[error("invalid location encoding {0}")]
    InvalidLocationEncoding(B256),

    /// An address-valued location or argument is the zero address
    #[error("zero address")]
    ZeroAddress,

    /// A location refers to the Nucleus itself
    #[error("location refers to the nucleus")]
    SelfReference,

    /// A pool-context location was used outside a pool operation
    #[error("pool-context location used without a pool in scope")]
    MissingPoolContext,

    // ========================================================================
    // Tokens
    // ========================================================================
    /// The token is the Nucleus itself or the zero address
    #[error("invalid token {0}")]
    InvalidToken(Address),

    /// Both sides of a pair are the same token
    #[error("identical tokens {0}")]
    IdenticalTokens(Address),

    /// The token reverted without return data, or has no contract
    #[error("token transfer failed for {token}")]
    TokenTransferFailed { token: Address },

    /// The token signalled failure by returning `false`
    #[error("token {token} returned false")]
    TokenTransferReturnedFalse { token: Address },

    /// The token reverted with its own data, passed through verbatim
    #[error("token {token} reverted: {data}")]
    TokenReverted { token: Address, data: Bytes },

    // ========================================================================
    // Ledger
    // ========================================================================
    /// The caller may not move value out of this location
    #[error("{caller} is not authorized to move from {location}")]
    NotAuthorized { caller: Address, location: Location },

    /// Not enough ledger balance at the source
    #[error("insufficient balance of {token} at {location}: available {available}, requested {requested}")]
    InsufficientBalance {
        token: Address,
        location: Location,
        available: u128,
        requested: u128,
    },

    /// An amount exceeded the representable range
    #[error("arithmetic overflow")]
    Overflow,

    // ========================================================================
    // Pools and trade requests
    // ========================================================================
    #[error("pool {0} does not exist")]
    PoolDoesNotExist(PoolId),

    #[error("pool {0} is not a limit order pool")]
    NotALimitOrderPool(PoolId),

    #[error("pool {0} is not a grid order pool")]
    NotAGridOrderPool(PoolId),

    #[error("pool {pool_id} has no trade request for {token_a} -> {token_b}")]
    TradeRequestNotConfigured {
        pool_id: PoolId,
        token_a: Address,
        token_b: Address,
    },

    #[error("grid pool would hold more than {max} tokens")]
    GridPoolTokenLimit { max: usize },

    // ========================================================================
    // Market orders
    // ========================================================================
    #[error("insufficient capacity: available {available}, requested {requested}")]
    InsufficientCapacity { available: u128, requested: u128 },

    #[error("amounts disagree with the exchange rate")]
    ExchangeRateDisagreement,

    #[error("a pool may not trade against itself")]
    SelfTrade,

    // ========================================================================
    // Callbacks
    // ========================================================================
    #[error("no contract deployed at {0}")]
    CallbackTargetMissing(Address),

    #[error("contract at {0} does not implement the callback")]
    CallbackNotSupported(Address),

    #[error("callback returned the wrong acknowledgement")]
    InvalidCallbackAcknowledgement,

    #[error("flash loan was not repaid")]
    FlashLoanNotRepaid,

    // ========================================================================
    // Guard and administration
    // ========================================================================
    #[error("reentrancy guard is locked")]
    ReentrancyGuardLocked,

    #[error("{0} is not the fee admin")]
    NotFeeAdmin(Address),

    #[error("invalid fee {0} ppm")]
    InvalidFee(u32),

    // ========================================================================
    // Opaque failures
    // ========================================================================
    /// A collaborator failed with its own reason
    #[error("reverted: {0}")]
    Reverted(String),

    /// A batch entry failed for a reason the engine cannot name
    #[error("unknown error")]
    UnknownError,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl NucleusError {
    /// Shorthand for an opaque collaborator revert.
    pub fn reverted(reason: impl Into<String>) -> Self {
        NucleusError::Reverted(reason.into())
    }
}
