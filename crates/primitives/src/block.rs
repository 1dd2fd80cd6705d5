use std::fmt;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Identifies a block by hash and number, without any of its content.
///
/// Canonicity checks compare hashes: two ids with the same number but a different
/// hash belong to different branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockId {
    /// The block hash.
    pub hash: B256,
    /// The block number.
    pub number: u64,
}

impl BlockId {
    /// Create a new [`BlockId`].
    pub const fn new(hash: B256, number: u64) -> Self {
        Self { hash, number }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.number, self.hash)
    }
}

/// A view over a layer-1 block header.
///
/// The parent linkage is what tells a linear extension of the chain apart from a reorg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1BlockRef {
    /// The block id.
    pub id: BlockId,
    /// The parent block id.
    pub parent: BlockId,
    /// The block timestamp, in seconds.
    pub timestamp: Timestamp,
}

impl L1BlockRef {
    /// Create a new [`L1BlockRef`] from its hash, number, parent hash and timestamp.
    ///
    /// The parent number is derived from the block number, saturating at zero.
    pub const fn new(hash: B256, number: u64, parent_hash: B256, timestamp: Timestamp) -> Self {
        Self {
            id: BlockId::new(hash, number),
            parent: BlockId::new(parent_hash, number.saturating_sub(1)),
            timestamp,
        }
    }

    /// Returns the block number.
    pub const fn number(&self) -> u64 {
        self.id.number
    }

    /// Returns the block hash.
    pub const fn hash(&self) -> B256 {
        self.id.hash
    }

    /// Returns true if `self` is the direct child of `other`.
    pub fn is_child_of(&self, other: &Self) -> bool {
        self.parent.hash == other.id.hash
    }
}

/// A view over a layer-2 block, with the layer-1 block its derivation is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2BlockRef {
    /// The block id.
    pub id: BlockId,
    /// The block timestamp, in seconds.
    pub timestamp: Timestamp,
    /// The L1 origin of this block.
    pub l1_origin: BlockId,
}

impl L2BlockRef {
    /// Create a new [`L2BlockRef`].
    pub const fn new(id: BlockId, timestamp: Timestamp, l1_origin: BlockId) -> Self {
        Self { id, timestamp, l1_origin }
    }

    /// Returns the block number.
    pub const fn number(&self) -> u64 {
        self.id.number
    }
}
