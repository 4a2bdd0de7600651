//! Domain events emitted by the Nucleus.
//!
//! Each event carries enough identifiers and amounts to rebuild ledger,
//! pool and fee state off-line. Events are part of the transactional state:
//! an operation that fails leaves no events behind.

use alloy_primitives::Address;

use crate::types::{ExchangeRate, Location, PoolId, PoolType};

/// A state change recorded by the Nucleus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Value moved between two locations (also emitted for no-op self moves)
    TokenTransferred {
        token: Address,
        from: Location,
        to: Location,
        amount: u128,
    },

    PoolCreated {
        pool_id: PoolId,
        pool_type: PoolType,
        owner: Address,
    },

    PoolOwnershipTransferred {
        pool_id: PoolId,
        from: Address,
        to: Address,
    },

    TradeRequestUpdated {
        pool_id: PoolId,
        token_a: Address,
        token_b: Address,
        exchange_rate: ExchangeRate,
        location_b: Location,
    },

    /// A trade request was filled
    MarketOrderExecuted {
        pool_id: PoolId,
        token_a: Address,
        token_b: Address,
        amount_a: u128,
        /// Gross tokenB paid by the taker
        amount_b: u128,
        /// tokenB delivered to the proceeds location after fees
        amount_b_to_pool: u128,
    },

    SwapFeeUpdated {
        token_a: Address,
        token_b: Address,
        fee_ppm: u32,
        receiver: Location,
    },

    FlashLoanFeeUpdated {
        token: Address,
        fee_ppm: u32,
        receiver: Location,
    },

    FlashLoan {
        borrower: Address,
        token: Address,
        amount: u128,
        fee: u128,
    },

    FeeAdminTransferred {
        from: Address,
        to: Address,
    },
}

impl Event {
    /// The pool this event concerns, if any.
    pub fn pool_id(&self) -> Option<PoolId> {
        match self {
            Event::PoolCreated { pool_id, .. }
            | Event::PoolOwnershipTransferred { pool_id, .. }
            | Event::TradeRequestUpdated { pool_id, .. }
            | Event::MarketOrderExecuted { pool_id, .. } => Some(*pool_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_id_accessor() {
        let id = PoolId::new(1, PoolType::Limit);
        let created = Event::PoolCreated {
            pool_id: id,
            pool_type: PoolType::Limit,
            owner: Address::repeat_byte(1),
        };
        assert_eq!(created.pool_id(), Some(id));

        let loan = Event::FlashLoan {
            borrower: Address::repeat_byte(2),
            token: Address::repeat_byte(3),
            amount: 1,
            fee: 0,
        };
        assert_eq!(loan.pool_id(), None);
    }
}
