//! Batch execution.
//!
//! A batch is an ordered list of [`Call`]s in their wire form: locations and
//! rates as 32-byte words, pool ids as raw integers. Each call is decoded
//! when it is dispatched, then run through its normal entry point, so every
//! call acquires and releases the guard itself and sees the state left by
//! the calls before it.
//!
//! The whole batch is one transaction. The first failing call aborts it and
//! its error is returned; an opaque revert with no reason is reported as
//! [`NucleusError::UnknownError`].

use alloy_primitives::{Address, Bytes, B256};
use tracing::{debug, warn};

use crate::engine::{CreateLimitOrderPool, FlashSwapParams, Nucleus};
use crate::error::{NucleusError, Result};
use crate::guard::Entry;
use crate::pools::{GridTradeRequest, TokenSource};
use crate::types::{BatchReceipt, ExchangeRate, LocationArg, PoolId};

/// One encoded self-call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    TokenTransfer {
        token: Address,
        amount: u128,
        src: B256,
        dst: B256,
    },
    TokenTransferIn {
        token: Address,
        amount: u128,
    },
    TokenTransferOut {
        token: Address,
        amount: u128,
    },
    CreateLimitOrderPool {
        token_a: Address,
        token_b: Address,
        amount_a: u128,
        exchange_rate: B256,
        location_a: B256,
        location_b: B256,
        receiver: Address,
    },
    UpdateLimitOrderPool {
        pool_id: u64,
        exchange_rate: B256,
        location_b: B256,
    },
    /// Sources are `(token, amount, location)`; requests are
    /// `(token_a, token_b, exchange_rate, location_b)`.
    CreateGridOrderPool {
        token_sources: Vec<(Address, u128, B256)>,
        trade_requests: Vec<(Address, Address, B256, B256)>,
        receiver: Address,
    },
    UpdateGridOrderPool {
        pool_id: u64,
        token_sources: Vec<(Address, u128, B256)>,
        trade_requests: Vec<(Address, Address, B256, B256)>,
    },
    TransferPoolOwnership {
        pool_id: u64,
        to: Address,
    },
    ExecuteMarketOrder {
        pool_id: u64,
        token_a: Address,
        token_b: Address,
        amount_a: u128,
        amount_b: u128,
        location_a: B256,
        location_b: B256,
    },
    /// A zero `callee` means no callback.
    ExecuteFlashSwap {
        pool_id: u64,
        token_a: Address,
        token_b: Address,
        amount_a: u128,
        amount_b: u128,
        location_a: B256,
        location_b: B256,
        callee: Address,
        data: Bytes,
    },
    FlashLoan {
        borrower: Address,
        token: Address,
        amount: u128,
        data: Bytes,
    },
    SetSwapFee {
        token_a: Address,
        token_b: Address,
        fee_ppm: u32,
        receiver: B256,
    },
    SetFlashLoanFee {
        token: Address,
        fee_ppm: u32,
        receiver: B256,
    },
    TransferFeeAdmin {
        new_admin: Address,
    },
}

/// What a call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutput {
    Unit,
    PoolCreated(PoolId),
}

impl Nucleus {
    /// Run `calls` in order as one atomic transaction.
    pub fn multicall(&mut self, caller: Address, calls: Vec<Call>) -> Result<BatchReceipt> {
        self.guard.check(Entry::Multicall)?;
        let snapshot = self.state.clone();
        let events_before = self.state.events.len();

        let mut outputs = Vec::with_capacity(calls.len());
        for (index, call) in calls.into_iter().enumerate() {
            match self.dispatch(caller, call) {
                Ok(output) => outputs.push(output),
                Err(err) => {
                    warn!(index, error = %err, "batch rolled back");
                    self.state = snapshot;
                    return Err(match err {
                        NucleusError::Reverted(reason) if reason.is_empty() => {
                            NucleusError::UnknownError
                        }
                        other => other,
                    });
                }
            }
        }

        let events_emitted = self.state.events.len().saturating_sub(events_before) as u64;
        let receipt = BatchReceipt::new(outputs, events_emitted, self.state_root());
        debug!(
            calls = receipt.calls_executed(),
            events_emitted,
            state_root = %receipt.state_root_hex(),
            "batch committed"
        );
        Ok(receipt)
    }

    fn dispatch(&mut self, caller: Address, call: Call) -> Result<CallOutput> {
        let unit = |r: Result<()>| r.map(|()| CallOutput::Unit);
        match call {
            Call::TokenTransfer {
                token,
                amount,
                src,
                dst,
            } => unit(self.token_transfer(
                caller,
                token,
                amount,
                LocationArg::decode(src)?,
                LocationArg::decode(dst)?,
            )),
            Call::TokenTransferIn { token, amount } => {
                unit(self.token_transfer_in(caller, token, amount))
            }
            Call::TokenTransferOut { token, amount } => {
                unit(self.token_transfer_out(caller, token, amount))
            }
            Call::CreateLimitOrderPool {
                token_a,
                token_b,
                amount_a,
                exchange_rate,
                location_a,
                location_b,
                receiver,
            } => {
                let params = CreateLimitOrderPool {
                    token_a,
                    token_b,
                    amount_a,
                    exchange_rate: ExchangeRate::decode(exchange_rate),
                    location_a: LocationArg::decode(location_a)?,
                    location_b: LocationArg::decode(location_b)?,
                    receiver,
                };
                self.create_limit_order_pool(caller, params)
                    .map(CallOutput::PoolCreated)
            }
            Call::UpdateLimitOrderPool {
                pool_id,
                exchange_rate,
                location_b,
            } => unit(self.update_limit_order_pool(
                caller,
                PoolId::from_raw(pool_id),
                ExchangeRate::decode(exchange_rate),
                LocationArg::decode(location_b)?,
            )),
            Call::CreateGridOrderPool {
                token_sources,
                trade_requests,
                receiver,
            } => {
                let sources = decode_sources(&token_sources)?;
                let requests = decode_requests(&trade_requests)?;
                self.create_grid_order_pool(caller, &sources, &requests, receiver)
                    .map(CallOutput::PoolCreated)
            }
            Call::UpdateGridOrderPool {
                pool_id,
                token_sources,
                trade_requests,
            } => {
                let sources = decode_sources(&token_sources)?;
                let requests = decode_requests(&trade_requests)?;
                unit(self.update_grid_order_pool(
                    caller,
                    PoolId::from_raw(pool_id),
                    &sources,
                    &requests,
                ))
            }
            Call::TransferPoolOwnership { pool_id, to } => {
                unit(self.transfer_pool_ownership(caller, PoolId::from_raw(pool_id), to))
            }
            Call::ExecuteMarketOrder {
                pool_id,
                token_a,
                token_b,
                amount_a,
                amount_b,
                location_a,
                location_b,
            } => {
                let params = FlashSwapParams {
                    pool_id: PoolId::from_raw(pool_id),
                    token_a,
                    token_b,
                    amount_a,
                    amount_b,
                    location_a: LocationArg::decode(location_a)?,
                    location_b: LocationArg::decode(location_b)?,
                };
                unit(self.execute_market_order(caller, params))
            }
            Call::ExecuteFlashSwap {
                pool_id,
                token_a,
                token_b,
                amount_a,
                amount_b,
                location_a,
                location_b,
                callee,
                data,
            } => {
                let params = FlashSwapParams {
                    pool_id: PoolId::from_raw(pool_id),
                    token_a,
                    token_b,
                    amount_a,
                    amount_b,
                    location_a: LocationArg::decode(location_a)?,
                    location_b: LocationArg::decode(location_b)?,
                };
                let callee = (!callee.is_zero()).then_some(callee);
                unit(self.execute_flash_swap(caller, params, callee, data))
            }
            Call::FlashLoan {
                borrower,
                token,
                amount,
                data,
            } => unit(self.flash_loan(caller, borrower, token, amount, data)),
            Call::SetSwapFee {
                token_a,
                token_b,
                fee_ppm,
                receiver,
            } => unit(self.set_swap_fee(
                caller,
                token_a,
                token_b,
                fee_ppm,
                LocationArg::decode(receiver)?,
            )),
            Call::SetFlashLoanFee {
                token,
                fee_ppm,
                receiver,
            } => unit(self.set_flash_loan_fee(
                caller,
                token,
                fee_ppm,
                LocationArg::decode(receiver)?,
            )),
            Call::TransferFeeAdmin { new_admin } => {
                unit(self.transfer_fee_admin(caller, new_admin))
            }
        }
    }
}

fn decode_sources(raw: &[(Address, u128, B256)]) -> Result<Vec<TokenSource>> {
    raw.iter()
        .map(|&(token, amount, location)| {
            Ok(TokenSource {
                token,
                amount,
                location: LocationArg::decode(location)?,
            })
        })
        .collect()
}

fn decode_requests(raw: &[(Address, Address, B256, B256)]) -> Result<Vec<GridTradeRequest>> {
    raw.iter()
        .map(|&(token_a, token_b, exchange_rate, location_b)| {
            Ok(GridTradeRequest {
                token_a,
                token_b,
                exchange_rate: ExchangeRate::decode(exchange_rate),
                location_b: LocationArg::decode(location_b)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NucleusConfig;
    use crate::guard::GuardState;
    use crate::token::TokenContract;
    use crate::types::Location;

    fn alice() -> Address {
        Address::repeat_byte(0xA1)
    }

    fn tok(n: u8) -> Address {
        Address::repeat_byte(0x70 + n)
    }

    fn setup() -> Nucleus {
        let mut nucleus = Nucleus::new(NucleusConfig::default()).unwrap();
        for n in 0..2 {
            let mut contract = TokenContract::standard(format!("T{n}"));
            contract.mint(alice(), 1_000);
            contract.approve(alice(), nucleus.address(), u128::MAX);
            nucleus.deploy_token(tok(n), contract).unwrap();
        }
        nucleus
    }

    #[test]
    fn test_batch_outputs() {
        let mut nucleus = setup();
        let receipt = nucleus
            .multicall(
                alice(),
                vec![
                    Call::TokenTransferIn { token: tok(0), amount: 100 },
                    Call::CreateLimitOrderPool {
                        token_a: tok(0),
                        token_b: tok(1),
                        amount_a: 100,
                        exchange_rate: ExchangeRate::new(1, 1).encode(),
                        location_a: LocationArg::InternalCaller.encode(),
                        location_b: LocationArg::ThisPool.encode(),
                        receiver: alice(),
                    },
                ],
            )
            .unwrap();
        let id = PoolId::new(1, crate::types::PoolType::Limit);
        assert_eq!(receipt.outputs, vec![CallOutput::Unit, CallOutput::PoolCreated(id)]);
        assert_eq!(receipt.events_emitted, 4);
        assert_eq!(receipt.state_root, nucleus.state_root());
        assert_eq!(nucleus.reentrancy_guard_state(), GuardState::Enterable);
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut nucleus = setup();
        let root = nucleus.state_root();
        let err = nucleus
            .multicall(
                alice(),
                vec![
                    Call::TokenTransferIn { token: tok(0), amount: 100 },
                    Call::TokenTransferOut { token: tok(0), amount: 101 },
                ],
            )
            .unwrap_err();
        assert!(matches!(err, NucleusError::InsufficientBalance { .. }));
        assert_eq!(nucleus.state_root(), root);
        assert_eq!(nucleus.token_balance(tok(0), Location::External(alice())), 1_000);
        assert!(nucleus.events().is_empty());
    }

    #[test]
    fn test_bad_location_word() {
        let mut nucleus = setup();
        let mut raw = [0u8; 32];
        raw[0] = 0x09;
        let err = nucleus
            .multicall(
                alice(),
                vec![Call::TokenTransfer {
                    token: tok(0),
                    amount: 1,
                    src: B256::from(raw),
                    dst: LocationArg::InternalCaller.encode(),
                }],
            )
            .unwrap_err();
        assert_eq!(err, NucleusError::InvalidLocationType(0x09));
    }

    #[test]
    fn test_empty_batch() {
        let mut nucleus = setup();
        let receipt = nucleus.multicall(alice(), Vec::new()).unwrap();
        assert!(receipt.is_empty());
        assert_eq!(receipt.events_emitted, 0);
    }
}
