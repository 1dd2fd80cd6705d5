use derive_more::derive::IsVariant;
use rollup_primitives::{BlockId, L1BlockRef, L2BlockRef, RollupConfig, summary::Summary};
use tracing::{debug, warn};

use crate::{
    state::DriverState,
    sync::{SyncError, find_safe_l2_head, find_unsafe_l2_head},
    traits::{ChainError, L1Chain, L2Chain},
};

/// An error that occurs while resolving an L1 reorg. Nothing is applied on error.
#[derive(Debug, thiserror::Error)]
pub enum ReorgError {
    #[error("Failed to find the L1 reorg base: {0}")]
    AncestorSearch(#[source] ChainError),
    #[error("Failed to find the new L2 unsafe head: {0}")]
    UnsafeHead(#[source] SyncError),
    #[error("Failed to find the new L2 safe head: {0}")]
    SafeHead(#[source] SyncError),
}

/// How a new L1 head relates to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum HeadUpdate {
    /// Same block as the current head.
    Unchanged,
    /// Direct child of the current head.
    Extension,
    /// Anything else. Most likely a reorg, possibly a gap in the received heads.
    Reorg,
}

impl HeadUpdate {
    /// Classify `new` against the `current` head.
    pub fn classify(current: &L1BlockRef, new: &L1BlockRef) -> Self {
        if current.hash() == new.hash() {
            Self::Unchanged
        } else if new.is_child_of(current) {
            Self::Extension
        } else {
            Self::Reorg
        }
    }
}

/// The heads to switch to after an L1 reorg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorgResolution {
    /// The last block shared by the old and new L1 branches.
    pub base: BlockId,
    /// The new L1 head.
    pub l1_head: L1BlockRef,
    /// The new L2 unsafe head.
    pub l2_head: L2BlockRef,
    /// The new L2 safe head.
    pub l2_safe_head: L2BlockRef,
}

impl ReorgResolution {
    /// Replace the L1 head and both L2 heads, dropping the buffered window.
    pub(crate) fn apply(self, state: &mut DriverState) {
        state.l1_head = self.l1_head;
        state.l1_window.clear();
        state.l2_head = self.l2_head;
        state.l2_safe_head = self.l2_safe_head;
    }
}

/// Find the last common ancestor between `new_head` and the canonical L1 chain.
///
/// Walks back from `new_head` through parent hashes until the block at a height is the
/// canonical one.
pub async fn find_l1_reorg_base<L: L1Chain + ?Sized>(
    l1: &L,
    new_head: &L1BlockRef,
) -> Result<L1BlockRef, ReorgError> {
    let mut block = *new_head;

    loop {
        let canonical =
            l1.ref_by_number(block.number()).await.map_err(ReorgError::AncestorSearch)?;
        if canonical.hash() == block.hash() {
            return Ok(block);
        }

        block = l1.ref_by_hash(block.parent.hash).await.map_err(ReorgError::AncestorSearch)?;
    }
}

/// Compute the new heads after the L1 chain reorged to `new_head`.
pub async fn resolve_reorg<L1, L2>(
    l1: &L1,
    l2: &L2,
    config: &RollupConfig,
    new_head: L1BlockRef,
    unsafe_head: L2BlockRef,
) -> Result<ReorgResolution, ReorgError>
where
    L1: L1Chain + ?Sized,
    L2: L2Chain + ?Sized,
{
    let base = find_l1_reorg_base(l1, &new_head).await?;
    debug!(base = %base.summary(), "Found L1 reorg base");

    let l2_head = find_unsafe_l2_head(l1, l2, unsafe_head, base.id, &config.genesis)
        .await
        .map_err(ReorgError::UnsafeHead)?;

    let l2_safe_head =
        find_safe_l2_head(l2, l2_head, base.id, config.seq_window_size, &config.genesis)
            .await
            .map_err(ReorgError::SafeHead)?;

    if l2_head != unsafe_head {
        warn!(
            old = %unsafe_head.summary(),
            new = %l2_head.summary(),
            "L1 reorg rewinds the L2 unsafe head"
        );
    }

    Ok(ReorgResolution { base: base.id, l1_head: new_head, l2_head, l2_safe_head })
}
