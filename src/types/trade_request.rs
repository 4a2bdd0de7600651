//! Standing directed offers.

use alloy_primitives::Address;

use crate::types::{ExchangeRate, Location};

/// The configurable half of a trade request: rate and proceeds destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TradeRequestConfig {
    pub exchange_rate: ExchangeRate,
    /// Where tokenB proceeds of fills are sent
    pub location_b: Location,
}

/// A directed `token_a -> token_b` offer of a pool, as seen by takers.
///
/// `amount_a` always mirrors the pool's ledger balance of `token_a`.
/// A request whose rate is null is not configured and cannot be filled;
/// its `location_b` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeRequest {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: u128,
    pub exchange_rate: ExchangeRate,
    pub location_b: Option<Location>,
}

impl TradeRequest {
    /// Build a view from the available amount and an optional configuration.
    pub fn new(
        token_a: Address,
        token_b: Address,
        amount_a: u128,
        config: Option<TradeRequestConfig>,
    ) -> Self {
        match config {
            Some(c) if !c.exchange_rate.is_null() => Self {
                token_a,
                token_b,
                amount_a,
                exchange_rate: c.exchange_rate,
                location_b: Some(c.location_b),
            },
            _ => Self {
                token_a,
                token_b,
                amount_a,
                exchange_rate: ExchangeRate::NULL,
                location_b: None,
            },
        }
    }

    /// True if the request can be filled at all.
    #[inline]
    pub fn is_configured(&self) -> bool {
        !self.exchange_rate.is_null() && self.location_b.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_config_is_not_configured() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let owner = Location::Internal(Address::repeat_byte(3));

        let req = TradeRequest::new(a, b, 50, None);
        assert!(!req.is_configured());
        assert_eq!(req.amount_a, 50);
        assert_eq!(req.location_b, None);

        let nulled = TradeRequest::new(
            a,
            b,
            50,
            Some(TradeRequestConfig {
                exchange_rate: ExchangeRate::NULL,
                location_b: owner,
            }),
        );
        assert!(!nulled.is_configured());
        assert_eq!(nulled.location_b, None);

        let live = TradeRequest::new(
            a,
            b,
            50,
            Some(TradeRequestConfig {
                exchange_rate: ExchangeRate::new(1, 2),
                location_b: owner,
            }),
        );
        assert!(live.is_configured());
        assert_eq!(live.location_b, Some(owner));
    }
}
