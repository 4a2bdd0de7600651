//! Tagged addressing for every entity that can hold value.
//!
//! ## Variants
//!
//! - [`Location::External`]: an address's balance in the real token contract
//! - [`Location::Internal`]: a ledger account held in the Nucleus reserve
//! - [`Location::Pool`]: a pool's segregated balance in the Nucleus reserve
//!
//! Call inputs are [`LocationArg`]s, which may also be one of three context
//! flags. Flags are resolved against a [`ResolveContext`] at the start of a
//! call and are never stored.
//!
//! ## Wire Form
//!
//! ```text
//! byte 0      tag (0x01 ext, 0x02 int, 0x03 pool, 0x11/0x12/0x13 flags)
//! bytes 1..12 zero
//! bytes 12..32 address            (address variants)
//! bytes 24..32 pool id, big-endian (pool variant, bytes 1..24 zero)
//! ```
//!
//! ## Example
//!
//! ```
//! use alloy_primitives::Address;
//! use nucleus::types::{Location, LocationArg};
//!
//! let user = Address::repeat_byte(0x11);
//! let encoded = Location::Internal(user).encode();
//! assert_eq!(LocationArg::decode(encoded).unwrap(), LocationArg::from(Location::Internal(user)));
//! ```

use std::fmt;

use alloy_primitives::{Address, B256};

use crate::error::{NucleusError, Result};
use crate::types::PoolId;

/// Type tag of an external-address location
pub const TAG_EXTERNAL: u8 = 0x01;
/// Type tag of an internal-address location
pub const TAG_INTERNAL: u8 = 0x02;
/// Type tag of a pool location
pub const TAG_POOL: u8 = 0x03;
/// Flag: the caller's external address
pub const TAG_EXTERNAL_CALLER: u8 = 0x11;
/// Flag: the caller's internal account
pub const TAG_INTERNAL_CALLER: u8 = 0x12;
/// Flag: the pool being operated on
pub const TAG_THIS_POOL: u8 = 0x13;

// ============================================================================
// Location
// ============================================================================

/// A concrete value-holding entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    /// Balance held by the token contract itself (not tracked by the ledger)
    External(Address),
    /// Ledger account owned by an address
    Internal(Address),
    /// Ledger balance of a pool
    Pool(PoolId),
}

impl Location {
    /// True for locations whose value lives in the Nucleus reserve.
    #[inline]
    pub fn is_ledger(&self) -> bool {
        !matches!(self, Location::External(_))
    }

    /// The address carried by an address variant.
    #[inline]
    pub fn address(&self) -> Option<Address> {
        match self {
            Location::External(a) | Location::Internal(a) => Some(*a),
            Location::Pool(_) => None,
        }
    }

    /// Encode into the 32-byte wire form.
    pub fn encode(&self) -> B256 {
        let mut out = [0u8; 32];
        match self {
            Location::External(a) => {
                out[0] = TAG_EXTERNAL;
                out[12..].copy_from_slice(a.as_slice());
            }
            Location::Internal(a) => {
                out[0] = TAG_INTERNAL;
                out[12..].copy_from_slice(a.as_slice());
            }
            Location::Pool(id) => {
                out[0] = TAG_POOL;
                out[24..].copy_from_slice(&id.get().to_be_bytes());
            }
        }
        B256::from(out)
    }

    /// Check the address-level invariants: never zero, never the Nucleus.
    pub fn validate(&self, nucleus: Address) -> Result<()> {
        if let Some(a) = self.address() {
            if a.is_zero() {
                return Err(NucleusError::ZeroAddress);
            }
            if a == nucleus {
                return Err(NucleusError::SelfReference);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::External(a) => write!(f, "external:{a}"),
            Location::Internal(a) => write!(f, "internal:{a}"),
            Location::Pool(id) => write!(f, "pool:{id}"),
        }
    }
}

// ============================================================================
// LocationArg
// ============================================================================

/// A location as accepted from a caller: concrete, or a context flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationArg {
    Concrete(Location),
    /// Resolves to `External(caller)`
    ExternalCaller,
    /// Resolves to `Internal(caller)`
    InternalCaller,
    /// Resolves to `Pool(pool in scope)`
    ThisPool,
}

impl From<Location> for LocationArg {
    fn from(location: Location) -> Self {
        LocationArg::Concrete(location)
    }
}

/// What flag resolution may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveContext {
    pub caller: Address,
    pub pool: Option<PoolId>,
}

impl ResolveContext {
    pub fn new(caller: Address) -> Self {
        Self { caller, pool: None }
    }

    pub fn with_pool(caller: Address, pool: PoolId) -> Self {
        Self {
            caller,
            pool: Some(pool),
        }
    }
}

impl LocationArg {
    /// Decode the 32-byte wire form.
    ///
    /// Fails with [`NucleusError::InvalidLocationType`] for an unknown tag and
    /// [`NucleusError::InvalidLocationEncoding`] for non-zero padding.
    pub fn decode(encoded: B256) -> Result<Self> {
        let bytes = encoded.as_slice();
        let padding_ok = |range: std::ops::Range<usize>| bytes[range].iter().all(|b| *b == 0);

        match bytes[0] {
            TAG_EXTERNAL | TAG_INTERNAL => {
                if !padding_ok(1..12) {
                    return Err(NucleusError::InvalidLocationEncoding(encoded));
                }
                let address = Address::from_slice(&bytes[12..]);
                Ok(LocationArg::Concrete(if bytes[0] == TAG_EXTERNAL {
                    Location::External(address)
                } else {
                    Location::Internal(address)
                }))
            }
            TAG_POOL => {
                if !padding_ok(1..24) {
                    return Err(NucleusError::InvalidLocationEncoding(encoded));
                }
                let mut id = [0u8; 8];
                id.copy_from_slice(&bytes[24..]);
                Ok(LocationArg::Concrete(Location::Pool(PoolId::from_raw(
                    u64::from_be_bytes(id),
                ))))
            }
            tag @ (TAG_EXTERNAL_CALLER | TAG_INTERNAL_CALLER | TAG_THIS_POOL) => {
                if !padding_ok(1..32) {
                    return Err(NucleusError::InvalidLocationEncoding(encoded));
                }
                Ok(match tag {
                    TAG_EXTERNAL_CALLER => LocationArg::ExternalCaller,
                    TAG_INTERNAL_CALLER => LocationArg::InternalCaller,
                    _ => LocationArg::ThisPool,
                })
            }
            tag => Err(NucleusError::InvalidLocationType(tag)),
        }
    }

    /// Encode into the 32-byte wire form.
    pub fn encode(&self) -> B256 {
        let flag = |tag: u8| {
            let mut out = [0u8; 32];
            out[0] = tag;
            B256::from(out)
        };
        match self {
            LocationArg::Concrete(location) => location.encode(),
            LocationArg::ExternalCaller => flag(TAG_EXTERNAL_CALLER),
            LocationArg::InternalCaller => flag(TAG_INTERNAL_CALLER),
            LocationArg::ThisPool => flag(TAG_THIS_POOL),
        }
    }

    /// Turn a call input into a concrete location.
    ///
    /// Flags resolve against `ctx`; the result is validated against the
    /// Nucleus address.
    pub fn resolve(&self, ctx: &ResolveContext, nucleus: Address) -> Result<Location> {
        let location = match self {
            LocationArg::Concrete(location) => *location,
            LocationArg::ExternalCaller => Location::External(ctx.caller),
            LocationArg::InternalCaller => Location::Internal(ctx.caller),
            LocationArg::ThisPool => Location::Pool(ctx.pool.ok_or(NucleusError::MissingPoolContext)?),
        };
        location.validate(nucleus)?;
        Ok(location)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PoolType;

    fn nucleus() -> Address {
        Address::repeat_byte(0xAA)
    }

    #[test]
    fn test_encode_decode_concrete() {
        let user = Address::repeat_byte(0x11);
        let pool = PoolId::new(3, PoolType::Grid);
        for location in [
            Location::External(user),
            Location::Internal(user),
            Location::Pool(pool),
        ] {
            let decoded = LocationArg::decode(location.encode()).unwrap();
            assert_eq!(decoded, LocationArg::Concrete(location));
        }
    }

    #[test]
    fn test_encode_decode_flags() {
        for flag in [
            LocationArg::ExternalCaller,
            LocationArg::InternalCaller,
            LocationArg::ThisPool,
        ] {
            assert_eq!(LocationArg::decode(flag.encode()).unwrap(), flag);
        }
    }

    #[test]
    fn test_decode_unknown_tag() {
        let mut raw = [0u8; 32];
        raw[0] = 0x07;
        assert_eq!(
            LocationArg::decode(B256::from(raw)),
            Err(NucleusError::InvalidLocationType(0x07))
        );
    }

    #[test]
    fn test_decode_dirty_padding() {
        let mut raw = Location::Internal(Address::repeat_byte(0x11)).encode().0;
        raw[5] = 1;
        assert!(matches!(
            LocationArg::decode(B256::from(raw)),
            Err(NucleusError::InvalidLocationEncoding(_))
        ));

        let mut raw = LocationArg::ThisPool.encode().0;
        raw[31] = 1;
        assert!(matches!(
            LocationArg::decode(B256::from(raw)),
            Err(NucleusError::InvalidLocationEncoding(_))
        ));
    }

    #[test]
    fn test_resolve_flags() {
        let caller = Address::repeat_byte(0x22);
        let pool = PoolId::new(1, PoolType::Limit);
        let ctx = ResolveContext::with_pool(caller, pool);

        assert_eq!(
            LocationArg::ExternalCaller.resolve(&ctx, nucleus()),
            Ok(Location::External(caller))
        );
        assert_eq!(
            LocationArg::InternalCaller.resolve(&ctx, nucleus()),
            Ok(Location::Internal(caller))
        );
        assert_eq!(
            LocationArg::ThisPool.resolve(&ctx, nucleus()),
            Ok(Location::Pool(pool))
        );
    }

    #[test]
    fn test_resolve_pool_flag_without_pool() {
        let ctx = ResolveContext::new(Address::repeat_byte(0x22));
        assert_eq!(
            LocationArg::ThisPool.resolve(&ctx, nucleus()),
            Err(NucleusError::MissingPoolContext)
        );
    }

    #[test]
    fn test_resolve_rejects_zero_and_self() {
        let ctx = ResolveContext::new(Address::repeat_byte(0x22));
        let zero = LocationArg::from(Location::Internal(Address::ZERO));
        assert_eq!(zero.resolve(&ctx, nucleus()), Err(NucleusError::ZeroAddress));

        let me = LocationArg::from(Location::External(nucleus()));
        assert_eq!(me.resolve(&ctx, nucleus()), Err(NucleusError::SelfReference));
    }

    #[test]
    fn test_is_ledger() {
        let a = Address::repeat_byte(1);
        assert!(!Location::External(a).is_ledger());
        assert!(Location::Internal(a).is_ledger());
        assert!(Location::Pool(PoolId::new(1, PoolType::Limit)).is_ledger());
    }
}
