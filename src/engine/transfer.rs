//! The transfer primitive.
//!
//! All value movement goes through [`Nucleus::move_tokens`]:
//!
//! | src | dst | effect |
//! |-----|-----|--------|
//! | ledger | ledger | bookkeeping only |
//! | external | ledger | `transferFrom` into the reserve, credit what arrived |
//! | ledger | external | debit, then `transfer` out of the reserve |
//! | external | external | `transferFrom` between the two holders |
//!
//! A move to the same location is a no-op that only checks the balance.

use alloy_primitives::Address;
use tracing::debug;

use crate::engine::Nucleus;
use crate::error::{NucleusError, Result};
use crate::guard::Entry;
use crate::token::TokenBank;
use crate::types::{Event, Location, LocationArg, ResolveContext};

impl Nucleus {
    // ========================================================================
    // Entry points
    // ========================================================================

    /// Move `amount` of `token` from `src` to `dst`.
    ///
    /// The caller must be the address of an address-type `src`, or own a
    /// pool-type `src`. This holds even for zero amounts and self moves.
    pub fn token_transfer(
        &mut self,
        caller: Address,
        token: Address,
        amount: u128,
        src: LocationArg,
        dst: LocationArg,
    ) -> Result<()> {
        let ctx = ResolveContext::new(caller);
        let src = src.resolve(&ctx, self.address)?;
        let dst = dst.resolve(&ctx, self.address)?;
        let entry = Entry::TokenTransfer {
            ledger_only: src.is_ledger() && dst.is_ledger(),
        };
        self.transact(entry, |n| {
            n.validate_token(token)?;
            n.authorize(caller, src)?;
            n.move_tokens(token, amount, src, dst)
        })
    }

    /// Deposit from the caller's wallet into the caller's internal account.
    pub fn token_transfer_in(&mut self, caller: Address, token: Address, amount: u128) -> Result<()> {
        self.token_transfer(
            caller,
            token,
            amount,
            LocationArg::ExternalCaller,
            LocationArg::InternalCaller,
        )
    }

    /// Withdraw from the caller's internal account to the caller's wallet.
    pub fn token_transfer_out(&mut self, caller: Address, token: Address, amount: u128) -> Result<()> {
        self.token_transfer(
            caller,
            token,
            amount,
            LocationArg::InternalCaller,
            LocationArg::ExternalCaller,
        )
    }

    /// `owner` approves `spender` on its own wallet balance of `token`.
    ///
    /// This is the owner calling the token contract directly: it moves no
    /// value and does not take the guard, so borrowers and callees may use
    /// it to authorize repayment.
    pub fn token_approve(
        &mut self,
        owner: Address,
        token: Address,
        spender: Address,
        amount: u128,
    ) -> Result<()> {
        self.validate_token(token)?;
        let contract = self
            .state
            .tokens
            .get_mut(token)
            .ok_or(NucleusError::TokenTransferFailed { token })?;
        contract.approve(owner, spender, amount);
        debug!(%owner, %token, %spender, amount, "allowance set");
        Ok(())
    }

    // ========================================================================
    // Primitive
    // ========================================================================

    /// Fail with `NotAuthorized` unless `caller` controls `src`.
    pub(crate) fn authorize(&self, caller: Address, src: Location) -> Result<()> {
        match src {
            Location::External(a) | Location::Internal(a) if a == caller => Ok(()),
            Location::Pool(id) => self.state.pools.ensure_owner(id, caller).map(|_| ()),
            _ => Err(NucleusError::NotAuthorized {
                caller,
                location: src,
            }),
        }
    }

    /// Fail unless value may be sent to `location`.
    pub(crate) fn ensure_destination(&self, location: Location) -> Result<()> {
        match location {
            Location::Pool(id) => self.state.pools.get(id).map(|_| ()),
            other => other.validate(self.address),
        }
    }

    /// Move without authorization checks. Callers authorize first.
    pub(crate) fn move_tokens(
        &mut self,
        token: Address,
        amount: u128,
        src: Location,
        dst: Location,
    ) -> Result<()> {
        if let Location::Pool(id) = src {
            self.state.pools.get(id)?;
        }
        self.ensure_destination(dst)?;

        let moved = if src == dst {
            if src.is_ledger() {
                self.state.ledger.ensure_balance(token, src, amount)?;
            }
            amount
        } else {
            match (src, dst) {
                (Location::External(from), Location::External(to)) => {
                    self.call_token(token, Some(self.address), from, to, amount)?;
                    amount
                }
                (Location::External(from), _) => {
                    let before = self.state.tokens.balance_of(token, self.address);
                    self.call_token(token, Some(self.address), from, self.address, amount)?;
                    let after = self.state.tokens.balance_of(token, self.address);
                    let received = after.saturating_sub(before);
                    self.state.ledger.credit(token, dst, received)?;
                    received
                }
                (_, Location::External(to)) => {
                    self.state.ledger.debit(token, src, amount)?;
                    self.call_token(token, None, self.address, to, amount)?;
                    amount
                }
                _ => {
                    self.state.ledger.debit(token, src, amount)?;
                    self.state.ledger.credit(token, dst, amount)?;
                    amount
                }
            }
        };

        debug!(%token, from = %src, to = %dst, amount = moved, "tokens moved");
        self.emit(Event::TokenTransferred {
            token,
            from: src,
            to: dst,
            amount: moved,
        });
        Ok(())
    }

    /// Call `transfer` (no spender) or `transferFrom` on a token, then run
    /// its hook if it has one.
    pub(crate) fn call_token(
        &mut self,
        token: Address,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        let contract = self
            .state
            .tokens
            .get_mut(token)
            .ok_or(NucleusError::TokenTransferFailed { token })?;
        let outcome = match spender {
            Some(spender) => contract.transfer_from(spender, from, to, amount),
            None => contract.transfer(from, to, amount),
        };
        let hook = contract.hook();
        TokenBank::interpret(token, outcome)?;

        if let Some(hook) = hook {
            hook.on_transfer(self, token, from, to, amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NucleusConfig;
    use crate::token::{TokenBehavior, TokenContract};

    fn token() -> Address {
        Address::repeat_byte(0x70)
    }

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn bob() -> Address {
        Address::repeat_byte(0xB0)
    }

    fn setup(behavior: TokenBehavior) -> Nucleus {
        let mut nucleus = Nucleus::new(NucleusConfig::default()).unwrap();
        let mut contract = TokenContract::new("TKA", behavior);
        contract.mint(alice(), 1_000);
        contract.approve(alice(), nucleus.address(), u128::MAX);
        nucleus.deploy_token(token(), contract).unwrap();
        nucleus
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let mut nucleus = setup(TokenBehavior::Standard);
        nucleus.token_transfer_in(alice(), token(), 300).unwrap();
        assert_eq!(nucleus.token_balance(token(), Location::Internal(alice())), 300);
        assert_eq!(nucleus.tokens().balance_of(token(), nucleus.address()), 300);

        nucleus.token_transfer_out(alice(), token(), 100).unwrap();
        assert_eq!(nucleus.token_balance(token(), Location::Internal(alice())), 200);
        assert_eq!(nucleus.token_balance(token(), Location::External(alice())), 800);
        assert_eq!(nucleus.total_ledger_balance(token()), 200);
    }

    #[test]
    fn test_internal_move_makes_no_token_call() {
        let mut nucleus = setup(TokenBehavior::Standard);
        nucleus.token_transfer_in(alice(), token(), 300).unwrap();
        let calls = nucleus.tokens().get(token()).unwrap().transfer_calls();

        nucleus
            .token_transfer(
                alice(),
                token(),
                50,
                LocationArg::InternalCaller,
                Location::Internal(bob()).into(),
            )
            .unwrap();
        assert_eq!(nucleus.token_balance(token(), Location::Internal(bob())), 50);
        assert_eq!(nucleus.tokens().get(token()).unwrap().transfer_calls(), calls);
    }

    #[test]
    fn test_unauthorized_source() {
        let mut nucleus = setup(TokenBehavior::Standard);
        nucleus.token_transfer_in(alice(), token(), 300).unwrap();
        let err = nucleus
            .token_transfer(
                bob(),
                token(),
                0,
                Location::Internal(alice()).into(),
                Location::Internal(alice()).into(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            NucleusError::NotAuthorized {
                caller: bob(),
                location: Location::Internal(alice()),
            }
        );
    }

    #[test]
    fn test_self_move_checks_balance_only() {
        let mut nucleus = setup(TokenBehavior::Standard);
        nucleus.token_transfer_in(alice(), token(), 10).unwrap();
        nucleus
            .token_transfer(alice(), token(), 10, LocationArg::InternalCaller, LocationArg::InternalCaller)
            .unwrap();
        assert_eq!(nucleus.token_balance(token(), Location::Internal(alice())), 10);
        assert!(matches!(
            nucleus.token_transfer(alice(), token(), 11, LocationArg::InternalCaller, LocationArg::InternalCaller),
            Err(NucleusError::InsufficientBalance { .. })
        ));

        let calls = nucleus.tokens().get(token()).unwrap().transfer_calls();
        nucleus
            .token_transfer(alice(), token(), 5, LocationArg::ExternalCaller, LocationArg::ExternalCaller)
            .unwrap();
        assert_eq!(nucleus.tokens().get(token()).unwrap().transfer_calls(), calls);
    }

    #[test]
    fn test_failure_kinds() {
        let mut falsy = setup(TokenBehavior::ReturnsFalse);
        assert_eq!(
            falsy.token_transfer_in(alice(), token(), 5_000),
            Err(NucleusError::TokenTransferReturnedFalse { token: token() })
        );

        let mut silent = setup(TokenBehavior::NoReturnData);
        silent.token_transfer_in(alice(), token(), 5).unwrap();
        assert_eq!(
            silent.token_transfer_in(alice(), token(), 5_000),
            Err(NucleusError::TokenTransferFailed { token: token() })
        );

        let mut missing = Nucleus::new(NucleusConfig::default()).unwrap();
        assert_eq!(
            missing.token_transfer_in(alice(), token(), 1),
            Err(NucleusError::TokenTransferFailed { token: token() })
        );
    }

    #[test]
    fn test_fee_on_transfer_deposit_credits_received() {
        let mut nucleus = setup(TokenBehavior::FeeOnTransfer { fee_ppm: 10_000 });
        nucleus.token_transfer_in(alice(), token(), 1_000).unwrap();
        assert_eq!(nucleus.token_balance(token(), Location::Internal(alice())), 990);
        assert_eq!(
            nucleus.total_ledger_balance(token()),
            nucleus.tokens().balance_of(token(), nucleus.address())
        );
    }

    #[test]
    fn test_invalid_token_and_locations() {
        let mut nucleus = setup(TokenBehavior::Standard);
        let me = nucleus.address();
        assert_eq!(
            nucleus.token_transfer_in(alice(), me, 1),
            Err(NucleusError::InvalidToken(me))
        );
        assert_eq!(
            nucleus.token_transfer(alice(), token(), 1, LocationArg::InternalCaller, LocationArg::ThisPool),
            Err(NucleusError::MissingPoolContext)
        );
        assert_eq!(
            nucleus.token_transfer(
                alice(),
                token(),
                1,
                LocationArg::InternalCaller,
                Location::External(me).into()
            ),
            Err(NucleusError::SelfReference)
        );
    }
}
