//! Callback contracts.
//!
//! Flash swap callees and flash loan borrowers are contracts deployed at an
//! address with [`Nucleus::deploy_contract`]. They run while the reentrancy
//! guard is in its callback window and must answer with the matching
//! acknowledgement.

use alloy_primitives::{keccak256, Address, Bytes, B256};

use crate::engine::Nucleus;
use crate::error::{NucleusError, Result};
use crate::types::{Location, PoolId};

/// Acknowledgement a flash swap callee must return.
pub fn flash_swap_ack() -> B256 {
    keccak256("NucleusFlashSwapCallee.onFlashSwap")
}

/// Acknowledgement a flash loan borrower must return.
pub fn flash_loan_ack() -> B256 {
    keccak256("ERC3156FlashBorrower.onFlashLoan")
}

/// Arguments passed to [`CallbackContract::on_flash_swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashSwapCallback {
    /// Caller of the fill
    pub initiator: Address,
    /// Contract being called
    pub callee: Address,
    pub pool_id: PoolId,
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: u128,
    pub amount_b: u128,
    /// Where tokenA was delivered
    pub location_a: Location,
    /// Where tokenB will be pulled from after the callback
    pub location_b: Location,
    pub data: Bytes,
}

/// Arguments passed to [`CallbackContract::on_flash_loan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashLoanCallback {
    pub initiator: Address,
    pub borrower: Address,
    pub token: Address,
    pub amount: u128,
    pub fee: u128,
    pub data: Bytes,
}

/// Code deployed at an address that the Nucleus can call back into.
///
/// Both hooks default to "not implemented".
pub trait CallbackContract {
    fn on_flash_swap(&self, nucleus: &mut Nucleus, call: &FlashSwapCallback) -> Result<B256> {
        let _ = nucleus;
        Err(NucleusError::CallbackNotSupported(call.callee))
    }

    fn on_flash_loan(&self, nucleus: &mut Nucleus, call: &FlashLoanCallback) -> Result<B256> {
        let _ = nucleus;
        Err(NucleusError::CallbackNotSupported(call.borrower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acks_are_distinct() {
        assert_ne!(flash_swap_ack(), flash_loan_ack());
        assert_ne!(flash_loan_ack(), B256::ZERO);
        assert_eq!(flash_loan_ack(), keccak256(b"ERC3156FlashBorrower.onFlashLoan"));
    }
}
