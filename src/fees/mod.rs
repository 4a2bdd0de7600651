//! Fee tables.
//!
//! Two independent tables:
//!
//! - swap fees, keyed by the ordered `(token_a, token_b)` pair
//! - flash loan fees, keyed by token
//!
//! Each has a wildcard entry keyed by the zero address (the zero pair for
//! swaps). "Stored" lookups return the raw entry, so an explicitly set zero
//! fee is distinguishable from an unset one. "Effective" lookups fall back
//! to the wildcard.
//!
//! ## Example
//!
//! ```
//! use alloy_primitives::Address;
//! use nucleus::fees::{FeeEngine, FeeRecord};
//! use nucleus::types::Location;
//!
//! let admin = Location::Internal(Address::repeat_byte(0xAD));
//! let mut fees = FeeEngine::new(FeeRecord::new(2_000, admin), FeeRecord::new(0, admin));
//!
//! let a = Address::repeat_byte(1);
//! let b = Address::repeat_byte(2);
//! assert_eq!(fees.stored_swap_fee(a, b), None);
//! assert_eq!(fees.swap_fee(a, b).fee_ppm, 2_000);
//!
//! fees.set_swap_fee(a, b, FeeRecord::new(0, admin));
//! assert_eq!(fees.swap_fee(a, b).fee_ppm, 0);
//! assert_eq!(FeeRecord::new(3_000, admin).fee_on(1_000_000), 3_000);
//! ```

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::types::Location;

/// 1,000,000 parts per million = 100%.
pub const PPM_DENOMINATOR: u32 = 1_000_000;

/// A fee rate and where collected fees go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeeRecord {
    pub fee_ppm: u32,
    pub receiver: Location,
}

impl FeeRecord {
    pub const fn new(fee_ppm: u32, receiver: Location) -> Self {
        Self { fee_ppm, receiver }
    }

    /// `floor(gross * fee_ppm / 1_000_000)`.
    ///
    /// Never exceeds `gross` for a valid record.
    pub fn fee_on(&self, gross: u128) -> u128 {
        let fee = U256::from(gross) * U256::from(self.fee_ppm) / U256::from(PPM_DENOMINATOR);
        // fee_ppm <= 1_000_000 keeps this within gross
        if fee > U256::from(gross) {
            gross
        } else {
            fee.to::<u128>()
        }
    }
}

/// Swap and flash loan fee tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeEngine {
    swap: HashMap<(Address, Address), FeeRecord>,
    flash_loan: HashMap<Address, FeeRecord>,
}

impl FeeEngine {
    /// Create the tables with their wildcard entries installed.
    pub fn new(default_swap: FeeRecord, default_flash_loan: FeeRecord) -> Self {
        let mut swap = HashMap::new();
        swap.insert((Address::ZERO, Address::ZERO), default_swap);
        let mut flash_loan = HashMap::new();
        flash_loan.insert(Address::ZERO, default_flash_loan);
        Self { swap, flash_loan }
    }

    // ========================================================================
    // Swap fees
    // ========================================================================

    pub fn stored_swap_fee(&self, token_a: Address, token_b: Address) -> Option<FeeRecord> {
        self.swap.get(&(token_a, token_b)).copied()
    }

    pub fn swap_fee(&self, token_a: Address, token_b: Address) -> FeeRecord {
        self.stored_swap_fee(token_a, token_b)
            .or_else(|| self.stored_swap_fee(Address::ZERO, Address::ZERO))
            .unwrap_or(FeeRecord::new(0, Location::Internal(Address::ZERO)))
    }

    pub fn set_swap_fee(&mut self, token_a: Address, token_b: Address, record: FeeRecord) {
        self.swap.insert((token_a, token_b), record);
    }

    // ========================================================================
    // Flash loan fees
    // ========================================================================

    pub fn stored_flash_loan_fee(&self, token: Address) -> Option<FeeRecord> {
        self.flash_loan.get(&token).copied()
    }

    pub fn flash_loan_fee(&self, token: Address) -> FeeRecord {
        self.stored_flash_loan_fee(token)
            .or_else(|| self.stored_flash_loan_fee(Address::ZERO))
            .unwrap_or(FeeRecord::new(0, Location::Internal(Address::ZERO)))
    }

    pub fn set_flash_loan_fee(&mut self, token: Address, record: FeeRecord) {
        self.flash_loan.insert(token, record);
    }

    /// All swap entries in a deterministic order.
    pub fn swap_entries(&self) -> Vec<((Address, Address), FeeRecord)> {
        let mut entries: Vec<_> = self.swap.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }

    /// All flash loan entries in a deterministic order.
    pub fn flash_loan_entries(&self) -> Vec<(Address, FeeRecord)> {
        let mut entries: Vec<_> = self.flash_loan.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Location {
        Location::Internal(Address::repeat_byte(0xAD))
    }

    #[test]
    fn test_fee_on_floor() {
        let record = FeeRecord::new(3_000, admin());
        assert_eq!(record.fee_on(1_000), 3);
        assert_eq!(record.fee_on(333), 0);
        assert_eq!(record.fee_on(0), 0);
    }

    #[test]
    fn test_fee_on_bounds() {
        assert_eq!(FeeRecord::new(PPM_DENOMINATOR, admin()).fee_on(777), 777);
        assert_eq!(FeeRecord::new(0, admin()).fee_on(u128::MAX), 0);
        assert_eq!(
            FeeRecord::new(500_000, admin()).fee_on(u128::MAX),
            u128::MAX / 2
        );
    }

    #[test]
    fn test_swap_fallback_and_direction() {
        let mut fees = FeeEngine::new(FeeRecord::new(100, admin()), FeeRecord::new(0, admin()));
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let other = Location::External(Address::repeat_byte(9));

        fees.set_swap_fee(a, b, FeeRecord::new(5_000, other));
        assert_eq!(fees.swap_fee(a, b), FeeRecord::new(5_000, other));
        // the reverse pair is independent
        assert_eq!(fees.stored_swap_fee(b, a), None);
        assert_eq!(fees.swap_fee(b, a), FeeRecord::new(100, admin()));
    }

    #[test]
    fn test_flash_loan_fallback() {
        let mut fees = FeeEngine::new(FeeRecord::new(0, admin()), FeeRecord::new(900, admin()));
        let t = Address::repeat_byte(7);
        assert_eq!(fees.flash_loan_fee(t).fee_ppm, 900);

        fees.set_flash_loan_fee(t, FeeRecord::new(0, admin()));
        assert_eq!(fees.stored_flash_loan_fee(t), Some(FeeRecord::new(0, admin())));
        assert_eq!(fees.flash_loan_fee(t).fee_ppm, 0);

        // changing the wildcard moves every unset token
        fees.set_flash_loan_fee(Address::ZERO, FeeRecord::new(1, admin()));
        assert_eq!(fees.flash_loan_fee(Address::repeat_byte(8)).fee_ppm, 1);
        assert_eq!(fees.flash_loan_fee(t).fee_ppm, 0);
    }

    #[test]
    fn test_entries_sorted() {
        let mut fees = FeeEngine::new(FeeRecord::new(0, admin()), FeeRecord::new(0, admin()));
        fees.set_swap_fee(Address::repeat_byte(3), Address::repeat_byte(1), FeeRecord::new(1, admin()));
        fees.set_swap_fee(Address::repeat_byte(2), Address::repeat_byte(1), FeeRecord::new(1, admin()));
        let keys: Vec<_> = fees.swap_entries().into_iter().map(|(k, _)| k.0).collect();
        assert_eq!(
            keys,
            vec![Address::ZERO, Address::repeat_byte(2), Address::repeat_byte(3)]
        );
    }
}
