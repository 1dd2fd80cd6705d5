use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{block::BlockId, time::Timestamp};

/// An error that occurs when loading or validating a [`RollupConfig`].
#[derive(Debug, thiserror::Error)]
pub enum RollupConfigError {
    #[error("Failed to read rollup config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse rollup config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Block time must be at least one second")]
    ZeroBlockTime,
    #[error("Sequencing window size must be at least one block")]
    ZeroSeqWindowSize,
}

/// The anchor points of the rollup on both chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genesis {
    /// The L1 block the rollup starts deriving after.
    pub l1: BlockId,
    /// The first L2 block.
    pub l2: BlockId,
    /// The timestamp of the first L2 block.
    pub l2_time: Timestamp,
}

/// Rollup configuration. Immutable for the lifetime of the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupConfig {
    /// The L2 block time, in seconds.
    pub block_time: u64,
    /// The number of L1 blocks in a sequencing window.
    pub seq_window_size: u64,
    /// The genesis anchors.
    pub genesis: Genesis,
}

impl RollupConfig {
    /// Parse a [`RollupConfig`] from its JSON representation and validate it.
    pub fn from_json(raw: &str) -> Result<Self, RollupConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a JSON rollup config file from disk and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RollupConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Check the invariants the driver relies on.
    pub const fn validate(&self) -> Result<(), RollupConfigError> {
        if self.block_time == 0 {
            return Err(RollupConfigError::ZeroBlockTime);
        }
        if self.seq_window_size == 0 {
            return Err(RollupConfigError::ZeroSeqWindowSize);
        }
        Ok(())
    }
}
