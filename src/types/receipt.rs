//! Receipt for a committed batch of calls.
//!
//! The receipt summarizes a [`multicall`](crate::Nucleus::multicall) and
//! carries the state root after the batch for verification.

use sha2::{Digest, Sha256};

use crate::engine::CallOutput;

/// Summary of a committed batch.
///
/// ## State Root
///
/// The 32-byte state root is a SHA-256 hash of the canonical encoding of
/// the ledger, pools and fee tables after the batch. Two Nucleus instances
/// that went through the same operations have the same root.
///
/// ## Example
///
/// ```
/// use nucleus::types::BatchReceipt;
///
/// let receipt = BatchReceipt::new(Vec::new(), 0, [0u8; 32]);
/// assert!(receipt.is_empty());
/// assert_eq!(receipt.state_root_hex().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReceipt {
    /// Output of each call, in order
    pub outputs: Vec<CallOutput>,

    /// Number of events the batch emitted
    pub events_emitted: u64,

    /// State root after execution (SHA-256 hash, 32 bytes)
    pub state_root: [u8; 32],
}

impl BatchReceipt {
    pub fn new(outputs: Vec<CallOutput>, events_emitted: u64, state_root: [u8; 32]) -> Self {
        Self {
            outputs,
            events_emitted,
            state_root,
        }
    }

    /// Number of calls executed
    pub fn calls_executed(&self) -> usize {
        self.outputs.len()
    }

    /// Compute SHA-256 hash of the given data
    ///
    /// Returns a 32-byte array suitable for use as a state root.
    pub fn compute_hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// Check if this receipt represents an empty batch
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
