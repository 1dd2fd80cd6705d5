use rollup_primitives::{BlockId, Genesis, L2BlockRef};
use tracing::{debug, trace};

use crate::traits::{ChainError, L1Chain, L2Chain};

/// An error that occurs while walking back the L2 chain after an L1 reorg.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("Reached L2 block {number}, below the L2 genesis block {genesis}")]
    BelowGenesis { number: u64, genesis: u64 },
}

/// Returns `Some(block)` if `block` is the L2 genesis, an error if it is below it.
fn check_genesis(block: L2BlockRef, genesis: &Genesis) -> Result<Option<L2BlockRef>, SyncError> {
    if block.number() < genesis.l2.number {
        return Err(SyncError::BelowGenesis {
            number: block.number(),
            genesis: genesis.l2.number,
        });
    }
    Ok((block.number() == genesis.l2.number).then_some(block))
}

/// Find the latest L2 block, at or below `old_unsafe`, that is still consistent with
/// the canonical L1 chain up to `base`.
///
/// The walk goes back by number until a block is found whose L1 origin is at or
/// below `base` and is still canonical. The L2 genesis block is always consistent.
pub async fn find_unsafe_l2_head<L1, L2>(
    l1: &L1,
    l2: &L2,
    old_unsafe: L2BlockRef,
    base: BlockId,
    genesis: &Genesis,
) -> Result<L2BlockRef, SyncError>
where
    L1: L1Chain + ?Sized,
    L2: L2Chain + ?Sized,
{
    let mut block = old_unsafe;

    loop {
        if let Some(genesis_block) = check_genesis(block, genesis)? {
            debug!("Unsafe head walked back to the L2 genesis");
            return Ok(genesis_block);
        }

        if block.l1_origin.number <= base.number {
            let canonical = l1.ref_by_number(block.l1_origin.number).await?;
            if canonical.hash() == block.l1_origin.hash {
                return Ok(block);
            }
            trace!(num = block.number(), origin = %block.l1_origin, "L1 origin is not canonical");
        }

        block = l2.ref_by_number(Some(block.number() - 1)).await?;
    }
}

/// Find the latest L2 block, at or below `unsafe_head`, whose whole sequencing window
/// is at or below `base`.
pub async fn find_safe_l2_head<L2>(
    l2: &L2,
    unsafe_head: L2BlockRef,
    base: BlockId,
    seq_window_size: u64,
    genesis: &Genesis,
) -> Result<L2BlockRef, SyncError>
where
    L2: L2Chain + ?Sized,
{
    let mut block = unsafe_head;

    loop {
        if block.l1_origin.number + seq_window_size <= base.number {
            return Ok(block);
        }

        if let Some(genesis_block) = check_genesis(block, genesis)? {
            debug!("Safe head walked back to the L2 genesis");
            return Ok(genesis_block);
        }

        block = l2.ref_by_number(Some(block.number() - 1)).await?;
    }
}
