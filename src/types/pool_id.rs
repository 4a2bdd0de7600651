//! Type-tagged pool identifiers.
//!
//! Identifiers are `sequence * 100 + type`, where `sequence` counts pools
//! created so far (starting at 1) and `type` is the [`PoolType`]
//! discriminant. They are strictly increasing and carry their pool type in
//! the two lowest decimal digits.
//!
//! ```
//! use nucleus::types::{PoolId, PoolType};
//!
//! let id = PoolId::new(1, PoolType::Limit);
//! assert_eq!(id.get(), 101);
//! assert_eq!(id.pool_type(), Some(PoolType::Limit));
//! assert_eq!(PoolId::new(2, PoolType::Grid).get(), 202);
//! ```

use std::fmt;

/// Multiplier separating the sequence from the type digits.
pub const POOL_ID_RADIX: u64 = 100;

/// Pool variant discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PoolType {
    /// Single-pair limit order pool
    Limit,
    /// Multi-token grid order pool
    Grid,
}

impl PoolType {
    /// Convert to the identifier discriminant
    pub fn to_u8(self) -> u8 {
        match self {
            PoolType::Limit => 1,
            PoolType::Grid => 2,
        }
    }

    /// Convert from the identifier discriminant
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(PoolType::Limit),
            2 => Some(PoolType::Grid),
            _ => None,
        }
    }
}

/// A pool identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PoolId(u64);

impl PoolId {
    /// Build the identifier for the `sequence`-th pool (1-based).
    pub const fn new(sequence: u64, pool_type: PoolType) -> Self {
        let discriminant = match pool_type {
            PoolType::Limit => 1,
            PoolType::Grid => 2,
        };
        Self(sequence * POOL_ID_RADIX + discriminant)
    }

    /// Wrap a raw value (e.g. decoded from the wire). Not validated.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The 1-based creation sequence number.
    #[inline]
    pub const fn sequence(&self) -> u64 {
        self.0 / POOL_ID_RADIX
    }

    /// The type encoded in the low digits, if valid.
    #[inline]
    pub fn pool_type(&self) -> Option<PoolType> {
        PoolType::from_u8((self.0 % POOL_ID_RADIX) as u8)
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
