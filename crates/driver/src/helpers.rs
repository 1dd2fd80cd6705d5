use alloy_primitives::B256;
use async_trait::async_trait;
use futures::future::try_join_all;
use rollup_clients::L1Client;
use rollup_primitives::{BlockId, L1BlockRef};

use crate::traits::{ChainError, L1Chain};

/// The maximum amount of L1 blocks fetched by a single [`L1Chain::range_after`] call.
pub const MAX_L1_RANGE: u64 = 64;

/// Check that `blocks` form a chain starting right after `base`, and return their ids.
pub(crate) fn verify_linkage(base: BlockId, blocks: &[L1BlockRef]) -> Result<Vec<BlockId>, ChainError> {
    let mut parent = base;
    let mut ids = Vec::with_capacity(blocks.len());

    for block in blocks {
        if block.number() != parent.number + 1 {
            return Err(ChainError::NonContiguous { expected: parent.number + 1, got: block.number() });
        }
        if block.parent.hash != parent.hash {
            return Err(ChainError::Custom(format!(
                "L1 block {} does not build on {}",
                block.id, parent
            )));
        }
        parent = block.id;
        ids.push(block.id);
    }

    Ok(ids)
}

#[async_trait]
impl L1Chain for L1Client {
    async fn head_ref(&self) -> Result<L1BlockRef, ChainError> {
        Ok(self.header_ref(None).await?)
    }

    async fn ref_by_number(&self, number: u64) -> Result<L1BlockRef, ChainError> {
        Ok(self.header_ref(Some(number)).await?)
    }

    async fn ref_by_hash(&self, hash: B256) -> Result<L1BlockRef, ChainError> {
        Ok(self.header_ref_by_hash(hash).await?)
    }

    /// Fetches at most [`MAX_L1_RANGE`] blocks after `base`, concurrently.
    async fn range_after(&self, base: BlockId) -> Result<Vec<BlockId>, ChainError> {
        let head = self.get_head().await?;
        let end = head.min(base.number + MAX_L1_RANGE);
        if end <= base.number {
            return Ok(Vec::new());
        }

        let blocks =
            try_join_all((base.number + 1..=end).map(|n| self.header_ref(Some(n)))).await?;

        verify_linkage(base, &blocks)
    }
}
