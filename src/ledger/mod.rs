//! Token ledger.
//!
//! Balances keyed by `(token, location)` for the two ledger location kinds
//! (internal accounts and pools). External balances are never stored here;
//! they live in the token contracts.
//!
//! The ledger only does checked bookkeeping. Authorization, token calls and
//! events belong to the transfer primitive in
//! [`Nucleus::token_transfer`](crate::Nucleus::token_transfer), which is the
//! only caller of [`credit`](TokenLedger::credit) and
//! [`debit`](TokenLedger::debit).
//!
//! ## Invariant
//!
//! For every token, `total_held(token)` equals the token's real balance held
//! by the Nucleus address.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::error::{NucleusError, Result};
use crate::types::Location;

/// Ledger balances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLedger {
    balances: HashMap<(Address, Location), u128>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn balance(&self, token: Address, location: Location) -> u128 {
        self.balances.get(&(token, location)).copied().unwrap_or(0)
    }

    /// Add `amount` to a ledger location.
    pub fn credit(&mut self, token: Address, location: Location, amount: u128) -> Result<()> {
        debug_assert!(location.is_ledger());
        if amount == 0 {
            return Ok(());
        }
        let entry = self.balances.entry((token, location)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(NucleusError::Overflow)?;
        Ok(())
    }

    /// Remove `amount` from a ledger location.
    pub fn debit(&mut self, token: Address, location: Location, amount: u128) -> Result<()> {
        debug_assert!(location.is_ledger());
        self.ensure_balance(token, location, amount)?;
        if amount == 0 {
            return Ok(());
        }
        let key = (token, location);
        let remaining = self.balance(token, location) - amount;
        if remaining == 0 {
            self.balances.remove(&key);
        } else {
            self.balances.insert(key, remaining);
        }
        Ok(())
    }

    /// Fail with `InsufficientBalance` unless `location` holds `amount`.
    pub fn ensure_balance(&self, token: Address, location: Location, amount: u128) -> Result<()> {
        let available = self.balance(token, location);
        if available < amount {
            return Err(NucleusError::InsufficientBalance {
                token,
                location,
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Sum of internal and pool balances of `token`.
    pub fn total_held(&self, token: Address) -> u128 {
        self.balances
            .iter()
            .filter(|((t, _), _)| *t == token)
            .fold(0u128, |acc, (_, v)| acc.saturating_add(*v))
    }

    /// Distinct tokens with a non-zero ledger balance, sorted.
    pub fn tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<_> = self.balances.keys().map(|(t, _)| *t).collect();
        tokens.sort();
        tokens.dedup();
        tokens
    }

    /// Non-zero entries in a deterministic order.
    pub fn entries(&self) -> Vec<((Address, Location), u128)> {
        let mut entries: Vec<_> = self.balances.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}
