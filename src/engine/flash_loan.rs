//! Flash loans.
//!
//! Loans come out of the Nucleus's real token balance, not out of any
//! ledger location, so the ledger is untouched while the loan is out.
//! Repayment of the principal is pulled back with `transferFrom` and
//! verified against the reserve's surplus over the ledger total before the
//! loan; the fee is then moved from the borrower's wallet to the fee
//! receiver.

use alloy_primitives::{Address, Bytes};
use tracing::debug;

use crate::engine::{flash_loan_ack, FlashLoanCallback, Nucleus};
use crate::error::{NucleusError, Result};
use crate::guard::Entry;
use crate::types::{Event, Location};

impl Nucleus {
    /// Largest loan available: the Nucleus's real balance of `token`.
    pub fn max_flash_loan(&self, token: Address) -> u128 {
        if token == self.address {
            return 0;
        }
        self.state.tokens.balance_of(token, self.address)
    }

    /// Fee charged on a loan of `amount`.
    pub fn flash_fee(&self, token: Address, amount: u128) -> Result<u128> {
        self.validate_token(token)?;
        Ok(self.state.fees.flash_loan_fee(token).fee_on(amount))
    }

    /// Lend `amount` of `token` to `borrower` for the duration of its
    /// `on_flash_loan` callback.
    pub fn flash_loan(
        &mut self,
        caller: Address,
        borrower: Address,
        token: Address,
        amount: u128,
        data: Bytes,
    ) -> Result<()> {
        self.transact(Entry::FlashLoan, |n| {
            n.validate_token(token)?;
            n.validate_account(borrower)?;
            let contract = n.callback_target(borrower)?;

            let record = n.state.fees.flash_loan_fee(token);
            let fee = record.fee_on(amount);
            let before = n.state.tokens.balance_of(token, n.address);
            let surplus = before.saturating_sub(n.state.ledger.total_held(token));
            if amount > before {
                return Err(NucleusError::InsufficientCapacity {
                    available: before,
                    requested: amount,
                });
            }

            n.call_token(token, None, n.address, borrower, amount)?;

            let call = FlashLoanCallback {
                initiator: caller,
                borrower,
                token,
                amount,
                fee,
                data,
            };
            let ack = n.with_callback_window(|n| contract.on_flash_loan(n, &call))?;
            if ack != flash_loan_ack() {
                return Err(NucleusError::InvalidCallbackAcknowledgement);
            }

            // The callback may legitimately move ledger value in or out of
            // the reserve, so repayment is judged on the unowned surplus.
            n.call_token(token, Some(n.address), borrower, n.address, amount)?;
            let reserve = n.state.tokens.balance_of(token, n.address);
            if reserve < n.state.ledger.total_held(token).saturating_add(surplus) {
                return Err(NucleusError::FlashLoanNotRepaid);
            }
            if fee > 0 {
                n.move_tokens(token, fee, Location::External(borrower), record.receiver)?;
            }

            debug!(%borrower, %token, amount, fee, "flash loan repaid");
            n.emit(Event::FlashLoan {
                borrower,
                token,
                amount,
                fee,
            });
            Ok(())
        })
    }
}
