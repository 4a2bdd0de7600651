//! Exchange rates between two tokens.
//!
//! ## Overview
//!
//! A rate is a pair of integers: `amount_a` of tokenA trades for `amount_b`
//! of tokenB. Keeping both sides as integers (rather than a single price)
//! lets fills be checked exactly with no floating point or fixed-point
//! rounding in the rate itself.
//!
//! ## Wire Form
//!
//! A `B256` with `amount_a` in the high 128 bits and `amount_b` in the low
//! 128 bits. The all-zero word is the null rate ("not configured").
//!
//! ## Rounding
//!
//! All products are taken in `U256`, so they cannot overflow. A taker may
//! never receive more tokenA than the rate implies for the tokenB paid.
//!
//! ## Examples
//!
//! ```
//! use nucleus::types::ExchangeRate;
//!
//! // 3 tokenA for every 2 tokenB
//! let rate = ExchangeRate::new(3, 2);
//! assert_eq!(rate.required_amount_b(3), Some(2));
//! assert_eq!(rate.required_amount_b(4), Some(3)); // ceil(8/3)
//! assert!(rate.accepts(4, 3));
//! assert!(!rate.accepts(4, 2));
//! ```

use alloy_primitives::{B256, U256};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// An exchange rate `amount_a : amount_b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExchangeRate {
    pub amount_a: u128,
    pub amount_b: u128,
}

impl ExchangeRate {
    /// The null rate: nothing is configured.
    pub const NULL: Self = Self {
        amount_a: 0,
        amount_b: 0,
    };

    pub const fn new(amount_a: u128, amount_b: u128) -> Self {
        Self { amount_a, amount_b }
    }

    /// True if this rate is the null rate.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.amount_a == 0 && self.amount_b == 0
    }

    // ========================================================================
    // Wire form
    // ========================================================================

    pub fn encode(&self) -> B256 {
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&self.amount_a.to_be_bytes());
        out[16..].copy_from_slice(&self.amount_b.to_be_bytes());
        B256::from(out)
    }

    pub fn decode(encoded: B256) -> Self {
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        a.copy_from_slice(&encoded[..16]);
        b.copy_from_slice(&encoded[16..]);
        Self {
            amount_a: u128::from_be_bytes(a),
            amount_b: u128::from_be_bytes(b),
        }
    }

    // ========================================================================
    // Fill math
    // ========================================================================

    /// Smallest tokenB payment for `amount_a` tokenA: `ceil(a * rate_b / rate_a)`.
    ///
    /// `None` if `rate_a` is zero or the result exceeds `u128`.
    pub fn required_amount_b(&self, amount_a: u128) -> Option<u128> {
        if self.amount_a == 0 {
            return None;
        }
        let numerator = U256::from(amount_a) * U256::from(self.amount_b);
        let denominator = U256::from(self.amount_a);
        let (quotient, remainder) = numerator.div_rem(denominator);
        let ceil = if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::from(1u8)
        };
        to_u128(ceil)
    }

    /// Largest tokenA amount purchasable with `amount_b` tokenB: `floor(b * rate_a / rate_b)`.
    ///
    /// `None` if `rate_b` is zero or the result exceeds `u128`.
    pub fn max_amount_a(&self, amount_b: u128) -> Option<u128> {
        if self.amount_b == 0 {
            return None;
        }
        let numerator = U256::from(amount_b) * U256::from(self.amount_a);
        to_u128(numerator / U256::from(self.amount_b))
    }

    /// Whether a fill of `amount_a` tokenA for `amount_b` tokenB agrees with this rate.
    ///
    /// The taker must not receive more than the rate implies, and the pair
    /// must be exact in one direction up to integer rounding.
    pub fn accepts(&self, amount_a: u128, amount_b: u128) -> bool {
        if self.is_null() {
            return false;
        }
        let wanted = U256::from(amount_a) * U256::from(self.amount_b);
        let paid = U256::from(amount_b) * U256::from(self.amount_a);
        if wanted > paid {
            return false;
        }
        self.required_amount_b(amount_a) == Some(amount_b)
            || self.max_amount_a(amount_b) == Some(amount_a)
    }

    // ========================================================================
    // Decimal view
    // ========================================================================

    /// The price of one tokenA in tokenB, if representable.
    pub fn price(&self) -> Option<Decimal> {
        if self.amount_a == 0 {
            return None;
        }
        let a = Decimal::from_u128(self.amount_a)?;
        let b = Decimal::from_u128(self.amount_b)?;
        b.checked_div(a)
    }

    /// Build a rate from a decimal price of one tokenA in tokenB.
    ///
    /// ```
    /// use nucleus::types::ExchangeRate;
    ///
    /// let rate = ExchangeRate::from_price("1.25").unwrap();
    /// assert_eq!(rate, ExchangeRate::new(100, 125));
    /// assert_eq!(rate.price().unwrap().to_string(), "1.25");
    /// ```
    pub fn from_price(s: &str) -> Option<Self> {
        let price = Decimal::from_str(s).ok()?;
        if price.is_sign_negative() || price.is_zero() {
            return None;
        }
        let price = price.normalize();
        let amount_b = price.mantissa().to_u128()?;
        let amount_a = 10u128.checked_pow(price.scale())?;
        Some(Self::new(amount_a, amount_b))
    }
}

fn to_u128(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        None
    } else {
        Some(value.to::<u128>())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
