use crate::{
    batch::BatchData,
    block::{L1BlockRef, L2BlockRef},
    config::RollupConfig,
};

/// A trait for objects that can be summarized into a string for logging purposes.
///
/// Sometimes the Debug impl is too verbose, and the Display impl does something different
/// than what we want. This trait allows us to have our custom verbosity.
pub trait Summary {
    /// Returns a summary of the object.
    fn summary(&self) -> String;
}

impl Summary for L1BlockRef {
    fn summary(&self) -> String {
        format!(
            "num={}, hash={}, parent={}, ts={}",
            self.id.number, self.id.hash, self.parent.hash, self.timestamp
        )
    }
}

impl Summary for L2BlockRef {
    fn summary(&self) -> String {
        format!(
            "num={}, hash={}, ts={}, l1_origin={}",
            self.id.number, self.id.hash, self.timestamp, self.l1_origin
        )
    }
}

impl Summary for BatchData {
    fn summary(&self) -> String {
        format!(
            "epoch={}, ts={}, parent={}, txs={}, bytes={}",
            self.epoch,
            self.timestamp,
            self.parent_hash,
            self.transactions.len(),
            self.tx_bytes()
        )
    }
}

impl Summary for RollupConfig {
    fn summary(&self) -> String {
        format!(
            "block_time={}s, seq_window_size={}, genesis_l1={}, genesis_l2={}, genesis_l2_time={}",
            self.block_time,
            self.seq_window_size,
            self.genesis.l1,
            self.genesis.l2,
            self.genesis.l2_time
        )
    }
}
