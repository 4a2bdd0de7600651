//! Fee administration.
//!
//! Only the fee admin may write either table. Receiver flags resolve
//! against the admin, so `InternalCaller` means the admin's own account;
//! `ThisPool` has no pool to refer to and fails.

use alloy_primitives::Address;
use tracing::debug;

use crate::engine::Nucleus;
use crate::error::{NucleusError, Result};
use crate::fees::{FeeRecord, PPM_DENOMINATOR};
use crate::guard::Entry;
use crate::types::{Event, Location, LocationArg, ResolveContext};

impl Nucleus {
    // ========================================================================
    // Queries
    // ========================================================================

    /// Effective swap fee, falling back to the wildcard.
    pub fn swap_fee(&self, token_a: Address, token_b: Address) -> FeeRecord {
        self.state.fees.swap_fee(token_a, token_b)
    }

    pub fn stored_swap_fee(&self, token_a: Address, token_b: Address) -> Option<FeeRecord> {
        self.state.fees.stored_swap_fee(token_a, token_b)
    }

    /// Effective flash loan fee, falling back to the wildcard.
    pub fn flash_loan_fee(&self, token: Address) -> FeeRecord {
        self.state.fees.flash_loan_fee(token)
    }

    pub fn stored_flash_loan_fee(&self, token: Address) -> Option<FeeRecord> {
        self.state.fees.stored_flash_loan_fee(token)
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Set the fee for the ordered pair. The zero pair is the wildcard.
    pub fn set_swap_fee(
        &mut self,
        caller: Address,
        token_a: Address,
        token_b: Address,
        fee_ppm: u32,
        receiver: LocationArg,
    ) -> Result<()> {
        self.set_swap_fees_for_pairs(caller, &[(token_a, token_b)], fee_ppm, receiver)
    }

    pub fn set_swap_fees_for_pairs(
        &mut self,
        caller: Address,
        pairs: &[(Address, Address)],
        fee_ppm: u32,
        receiver: LocationArg,
    ) -> Result<()> {
        self.transact(Entry::SetFees, |n| {
            let record = n.fee_record(caller, fee_ppm, receiver)?;
            for &(token_a, token_b) in pairs {
                n.validate_fee_token(token_a)?;
                n.validate_fee_token(token_b)?;
                n.state.fees.set_swap_fee(token_a, token_b, record);
                debug!(%token_a, %token_b, fee_ppm, receiver = %record.receiver, "swap fee updated");
                n.emit(Event::SwapFeeUpdated {
                    token_a,
                    token_b,
                    fee_ppm,
                    receiver: record.receiver,
                });
            }
            Ok(())
        })
    }

    /// Set the flash loan fee for `token`. The zero token is the wildcard.
    pub fn set_flash_loan_fee(
        &mut self,
        caller: Address,
        token: Address,
        fee_ppm: u32,
        receiver: LocationArg,
    ) -> Result<()> {
        self.set_flash_loan_fees_for_tokens(caller, &[token], fee_ppm, receiver)
    }

    pub fn set_flash_loan_fees_for_tokens(
        &mut self,
        caller: Address,
        tokens: &[Address],
        fee_ppm: u32,
        receiver: LocationArg,
    ) -> Result<()> {
        self.transact(Entry::SetFees, |n| {
            let record = n.fee_record(caller, fee_ppm, receiver)?;
            for &token in tokens {
                n.validate_fee_token(token)?;
                n.state.fees.set_flash_loan_fee(token, record);
                debug!(%token, fee_ppm, receiver = %record.receiver, "flash loan fee updated");
                n.emit(Event::FlashLoanFeeUpdated {
                    token,
                    fee_ppm,
                    receiver: record.receiver,
                });
            }
            Ok(())
        })
    }

    pub fn transfer_fee_admin(&mut self, caller: Address, new_admin: Address) -> Result<()> {
        self.transact(Entry::TransferFeeAdmin, |n| {
            n.ensure_fee_admin(caller)?;
            n.validate_account(new_admin)?;
            n.state.fee_admin = new_admin;
            debug!(from = %caller, to = %new_admin, "fee admin transferred");
            n.emit(Event::FeeAdminTransferred {
                from: caller,
                to: new_admin,
            });
            Ok(())
        })
    }

    fn ensure_fee_admin(&self, caller: Address) -> Result<()> {
        if caller != self.state.fee_admin {
            return Err(NucleusError::NotFeeAdmin(caller));
        }
        Ok(())
    }

    fn fee_record(&self, caller: Address, fee_ppm: u32, receiver: LocationArg) -> Result<FeeRecord> {
        self.ensure_fee_admin(caller)?;
        if fee_ppm > PPM_DENOMINATOR {
            return Err(NucleusError::InvalidFee(fee_ppm));
        }
        let receiver: Location = receiver.resolve(&ResolveContext::new(caller), self.address)?;
        self.ensure_destination(receiver)?;
        Ok(FeeRecord::new(fee_ppm, receiver))
    }

    /// Fee keys may be the zero wildcard but never the Nucleus.
    fn validate_fee_token(&self, token: Address) -> Result<()> {
        if token == self.address {
            return Err(NucleusError::InvalidToken(token));
        }
        Ok(())
    }
}
