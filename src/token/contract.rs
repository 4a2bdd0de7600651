//! In-memory fungible token contract.
//!
//! Implements the standard transfer/approve/balance surface plus the
//! failure-signalling variants found in the wild, so the Nucleus can be
//! exercised against them:
//!
//! | Behavior | On success | On failure |
//! |----------|------------|------------|
//! | `Standard` | returns `true` | reverts with a reason |
//! | `NoReturnData` | returns nothing | reverts with no data |
//! | `ReturnsFalse` | returns `true` | returns `false` |
//! | `FeeOnTransfer` | returns `true`, burns a cut | reverts with a reason |
//! | `RevertsWith` | returns `true` | reverts with a custom reason |

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};

use crate::engine::Nucleus;
use crate::error::Result;
use crate::fees::PPM_DENOMINATOR;

/// How a token reports outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenBehavior {
    Standard,
    NoReturnData,
    ReturnsFalse,
    /// Burns `fee_ppm` of every transfer
    FeeOnTransfer { fee_ppm: u32 },
    RevertsWith(String),
}

/// Data returned by a call that did not revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenReturn {
    True,
    False,
    NoData,
}

/// Revert payload of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRevert(pub Bytes);

/// Code run after every successful transfer of a hooked token.
///
/// The Nucleus reentrancy guard is locked while a hook runs.
pub trait TransferHook {
    fn on_transfer(
        &self,
        nucleus: &mut Nucleus,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()>;
}

/// A token contract's state and behavior.
#[derive(Clone)]
pub struct TokenContract {
    symbol: String,
    behavior: TokenBehavior,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    total_supply: u128,
    hook: Option<Arc<dyn TransferHook>>,
    transfer_calls: u64,
}

impl fmt::Debug for TokenContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenContract")
            .field("symbol", &self.symbol)
            .field("behavior", &self.behavior)
            .field("total_supply", &self.total_supply)
            .field("hooked", &self.hook.is_some())
            .field("transfer_calls", &self.transfer_calls)
            .finish()
    }
}

impl TokenContract {
    pub fn new(symbol: impl Into<String>, behavior: TokenBehavior) -> Self {
        Self {
            symbol: symbol.into(),
            behavior,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            hook: None,
            transfer_calls: 0,
        }
    }

    pub fn standard(symbol: impl Into<String>) -> Self {
        Self::new(symbol, TokenBehavior::Standard)
    }

    pub fn with_hook(mut self, hook: Arc<dyn TransferHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn behavior(&self) -> &TokenBehavior {
        &self.behavior
    }

    pub fn hook(&self) -> Option<Arc<dyn TransferHook>> {
        self.hook.clone()
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Number of `transfer`/`transfer_from` calls received
    pub fn transfer_calls(&self) -> u64 {
        self.transfer_calls
    }

    pub fn balance_of(&self, holder: Address) -> u128 {
        self.balances.get(&holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> u128 {
        self.allowances.get(&(owner, spender)).copied().unwrap_or(0)
    }

    pub fn mint(&mut self, to: Address, amount: u128) {
        *self.balances.entry(to).or_insert(0) += amount;
        self.total_supply += amount;
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) {
        self.allowances.insert((owner, spender), amount);
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> std::result::Result<TokenReturn, TokenRevert> {
        self.transfer_calls += 1;
        if self.balance_of(from) < amount {
            return self.fail("transfer amount exceeds balance");
        }
        self.move_balance(from, to, amount);
        Ok(self.success())
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> std::result::Result<TokenReturn, TokenRevert> {
        self.transfer_calls += 1;
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return self.fail("insufficient allowance");
        }
        if self.balance_of(from) < amount {
            return self.fail("transfer amount exceeds balance");
        }
        if allowance != u128::MAX {
            self.allowances.insert((from, spender), allowance - amount);
        }
        self.move_balance(from, to, amount);
        Ok(self.success())
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: u128) {
        let burned = match self.behavior {
            TokenBehavior::FeeOnTransfer { fee_ppm } => {
                amount / u128::from(PPM_DENOMINATOR) * u128::from(fee_ppm)
                    + amount % u128::from(PPM_DENOMINATOR) * u128::from(fee_ppm)
                        / u128::from(PPM_DENOMINATOR)
            }
            _ => 0,
        };
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance -= amount;
        }
        *self.balances.entry(to).or_insert(0) += amount - burned;
        self.total_supply -= burned;
    }

    fn success(&self) -> TokenReturn {
        match self.behavior {
            TokenBehavior::NoReturnData => TokenReturn::NoData,
            _ => TokenReturn::True,
        }
    }

    fn fail(&self, reason: &str) -> std::result::Result<TokenReturn, TokenRevert> {
        match &self.behavior {
            TokenBehavior::ReturnsFalse => Ok(TokenReturn::False),
            TokenBehavior::NoReturnData => Err(TokenRevert(Bytes::new())),
            TokenBehavior::RevertsWith(custom) => {
                Err(TokenRevert(Bytes::from(custom.clone().into_bytes())))
            }
            TokenBehavior::Standard | TokenBehavior::FeeOnTransfer { .. } => {
                Err(TokenRevert(Bytes::from(reason.as_bytes().to_vec())))
            }
        }
    }
}
