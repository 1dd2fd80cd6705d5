use alloy_primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// The data of a single L2 block as it is submitted to L1.
///
/// The driver treats this as opaque: it is produced by the output pipeline when
/// building a block and handed over to the batch submitter untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchData {
    /// The hash of the parent L2 block.
    pub parent_hash: B256,
    /// The L1 origin number (epoch) of the block.
    pub epoch: u64,
    /// The L2 block timestamp.
    pub timestamp: Timestamp,
    /// The encoded transactions of the block.
    pub transactions: Vec<Bytes>,
}

impl BatchData {
    /// Returns the total size of the transaction list, in bytes.
    pub fn tx_bytes(&self) -> usize {
        self.transactions.iter().map(|tx| tx.len()).sum()
    }
}
