use rollup_primitives::BlockId;
use tracing::trace;

use crate::traits::{ChainError, L1Chain};

/// The buffer of L1 blocks that the next L2 epochs are derived from.
///
/// Entries are contiguous and strictly increasing by number, starting right after
/// the L1 origin of the safe head. Callers pass that origin as `fallback` whenever
/// the end of an empty window is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct L1Window {
    blocks: Vec<BlockId>,
}

impl L1Window {
    /// Create an empty window.
    pub const fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Returns the amount of buffered blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no blocks are buffered.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the buffered blocks, in ascending order.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Returns the last buffered block, or `fallback` if the window is empty.
    pub fn end(&self, fallback: BlockId) -> BlockId {
        self.blocks.last().copied().unwrap_or(fallback)
    }

    /// Fetch every L1 block after [`Self::end`] and append them in order.
    ///
    /// Returns the amount of appended blocks. On error the window is left unchanged.
    pub async fn extend<L: L1Chain + ?Sized>(
        &mut self,
        l1: &L,
        fallback: BlockId,
    ) -> Result<usize, ChainError> {
        let end = self.end(fallback);
        trace!(cached = self.len(), %end, "Extending the L1 window");

        let next = l1.range_after(end).await?;

        let mut expected = end.number + 1;
        for id in &next {
            if id.number != expected {
                return Err(ChainError::NonContiguous { expected, got: id.number });
            }
            expected += 1;
        }

        let appended = next.len();
        self.blocks.extend(next);
        Ok(appended)
    }

    /// Returns the next sequencing window of `size` blocks, or `None` if not enough
    /// blocks are buffered yet.
    pub fn sequencing_window(&self, size: u64) -> Option<&[BlockId]> {
        let size = usize::try_from(size).ok()?;
        self.blocks.get(..size)
    }

    /// Evict the leading block, after its epoch has been derived.
    pub fn advance(&mut self) -> Option<BlockId> {
        if self.blocks.is_empty() {
            return None;
        }
        Some(self.blocks.remove(0))
    }

    /// Append `id` if its parent is the current end of the window.
    ///
    /// Returns true if the block was appended.
    pub fn push_if_extends(&mut self, fallback: BlockId, parent: BlockId, id: BlockId) -> bool {
        if self.end(fallback) != parent {
            return false;
        }
        self.blocks.push(id);
        true
    }

    /// Drop all buffered blocks.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}
