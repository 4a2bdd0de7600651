//! Reentrancy guard.
//!
//! ## States
//!
//! ```text
//! Enterable --acquire--> Locked --open_callback_window--> CallbackWindow
//!     ^                    |  ^                                |
//!     +-----release--------+  +------close_callback_window-----+
//! ```
//!
//! - `Enterable`: no operation is running; any entry point may start.
//! - `Locked`: an operation is running. Token contracts called from here
//!   may not re-enter anything.
//! - `CallbackWindow`: a flash callee or loan borrower is running. Only the
//!   entries for which [`Entry::callback_reentrant`] holds may start; they
//!   lock the guard for their own duration and hand the window back.
//!
//! Read-only queries never consult the guard.

use tracing::trace;

use crate::error::{NucleusError, Result};

/// Guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Enterable,
    Locked,
    CallbackWindow,
}

/// Guarded entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// `ledger_only` when neither side is an external location
    TokenTransfer { ledger_only: bool },
    CreatePool,
    UpdatePool,
    TransferPoolOwnership,
    MarketOrder,
    FlashLoan,
    SetFees,
    TransferFeeAdmin,
    Multicall,
}

impl Entry {
    /// The closed list of entries allowed to start inside a callback window.
    pub fn callback_reentrant(&self) -> bool {
        match self {
            Entry::TokenTransfer { ledger_only } => *ledger_only,
            Entry::MarketOrder | Entry::FlashLoan | Entry::UpdatePool => true,
            Entry::CreatePool
            | Entry::TransferPoolOwnership
            | Entry::SetFees
            | Entry::TransferFeeAdmin
            | Entry::Multicall => false,
        }
    }
}

/// The single process-wide guard.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    state: GuardState,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Fail unless `entry` may start in the current state.
    pub fn check(&self, entry: Entry) -> Result<()> {
        match self.state {
            GuardState::Enterable => Ok(()),
            GuardState::CallbackWindow if entry.callback_reentrant() => Ok(()),
            state => {
                trace!(?entry, ?state, "guard rejected entry");
                Err(NucleusError::ReentrancyGuardLocked)
            }
        }
    }

    /// Lock for `entry`, returning the state to restore on exit.
    pub fn acquire(&mut self, entry: Entry) -> Result<GuardState> {
        self.check(entry)?;
        let previous = self.state;
        self.state = GuardState::Locked;
        trace!(?entry, from = ?previous, "guard locked");
        Ok(previous)
    }

    /// Restore the state returned by [`acquire`](Self::acquire).
    pub fn release(&mut self, previous: GuardState) {
        trace!(to = ?previous, "guard released");
        self.state = previous;
    }

    /// Open the window for a callback; returns the state to restore.
    pub fn open_callback_window(&mut self) -> GuardState {
        let previous = self.state;
        self.state = GuardState::CallbackWindow;
        trace!(from = ?previous, "callback window opened");
        previous
    }

    pub fn close_callback_window(&mut self, previous: GuardState) {
        self.state = previous;
    }
}
