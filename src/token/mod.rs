//! Fungible token collaborators.
//!
//! The Nucleus never trusts a token's reply. It calls a [`TokenContract`]
//! through the [`TokenBank`], which holds every deployed contract by
//! address, and classifies the reply into one of the failure kinds of
//! [`NucleusError`](crate::NucleusError).
//!
//! ## Components
//!
//! - [`TokenContract`]: balances, allowances and a configurable [`TokenBehavior`]
//! - [`TransferHook`]: optional reentrant code run after a successful transfer
//! - [`TokenBank`]: the address space of deployed token contracts

mod contract;

pub use contract::{TokenBehavior, TokenContract, TokenReturn, TokenRevert, TransferHook};

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::error::{NucleusError, Result};

/// Deployed token contracts, by address.
#[derive(Debug, Clone, Default)]
pub struct TokenBank {
    contracts: HashMap<Address, TokenContract>,
}

impl TokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deploy (or replace) the contract at `address`.
    pub fn deploy(&mut self, address: Address, contract: TokenContract) {
        self.contracts.insert(address, contract);
    }

    pub fn contains(&self, address: Address) -> bool {
        self.contracts.contains_key(&address)
    }

    pub fn get(&self, address: Address) -> Option<&TokenContract> {
        self.contracts.get(&address)
    }

    pub fn get_mut(&mut self, address: Address) -> Option<&mut TokenContract> {
        self.contracts.get_mut(&address)
    }

    /// `balanceOf`; zero for an address with no contract.
    pub fn balance_of(&self, token: Address, holder: Address) -> u128 {
        self.get(token).map_or(0, |c| c.balance_of(holder))
    }

    /// Classify a raw call result.
    ///
    /// `True` and `NoData` are success. `False` and reverts are the distinct
    /// transfer failure kinds; an empty revert carries nothing to pass on.
    pub fn interpret(
        token: Address,
        outcome: std::result::Result<TokenReturn, TokenRevert>,
    ) -> Result<()> {
        match outcome {
            Ok(TokenReturn::True) | Ok(TokenReturn::NoData) => Ok(()),
            Ok(TokenReturn::False) => Err(NucleusError::TokenTransferReturnedFalse { token }),
            Err(TokenRevert(data)) if data.is_empty() => {
                Err(NucleusError::TokenTransferFailed { token })
            }
            Err(TokenRevert(data)) => Err(NucleusError::TokenReverted { token, data }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Bytes;

    #[test]
    fn test_interpret_outcomes() {
        let t = Address::repeat_byte(0x70);
        assert_eq!(TokenBank::interpret(t, Ok(TokenReturn::True)), Ok(()));
        assert_eq!(TokenBank::interpret(t, Ok(TokenReturn::NoData)), Ok(()));
        assert_eq!(
            TokenBank::interpret(t, Ok(TokenReturn::False)),
            Err(NucleusError::TokenTransferReturnedFalse { token: t })
        );
        assert_eq!(
            TokenBank::interpret(t, Err(TokenRevert(Bytes::new()))),
            Err(NucleusError::TokenTransferFailed { token: t })
        );
        assert_eq!(
            TokenBank::interpret(t, Err(TokenRevert(Bytes::from_static(b"custom")))),
            Err(NucleusError::TokenReverted {
                token: t,
                data: Bytes::from_static(b"custom")
            })
        );
    }

    #[test]
    fn test_balance_of_missing_contract() {
        let mut bank = TokenBank::new();
        let t = Address::repeat_byte(0x70);
        let holder = Address::repeat_byte(0x01);
        assert_eq!(bank.balance_of(t, holder), 0);

        let mut contract = TokenContract::standard("TKA");
        contract.mint(holder, 5);
        bank.deploy(t, contract);
        assert!(bank.contains(t));
        assert_eq!(bank.balance_of(t, holder), 5);
    }
}
