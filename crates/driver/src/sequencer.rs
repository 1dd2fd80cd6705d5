use std::{sync::Arc, time::Instant};

use derive_more::derive::{Display, IsVariant};
use rollup_primitives::{L1BlockRef, L2BlockRef, RollupConfig, summary::Summary};
use tracing::{debug, info, trace};

use crate::{
    driver::DriverError,
    metrics::DriverMetrics,
    state::DriverState,
    submission,
    traits::{BatchSubmitter, ChainError, L1Chain, OutputPipeline},
};

/// Why a block production request was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IsVariant)]
pub enum SkipReason {
    /// Not enough time has passed since the unsafe head for the next origin.
    TooEarly,
    /// The next origin is not past the L1 genesis block.
    BeforeGenesis,
}

/// Whether a block can be produced on top of the unsafe head with the given origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum ProductionGate {
    /// Build the block.
    Produce,
    /// Skip this request.
    Skip(SkipReason),
}

impl ProductionGate {
    /// Check whether a block can be built on `l2_head` with `next_origin` as L1 origin.
    pub const fn check(config: &RollupConfig, l2_head: &L2BlockRef, next_origin: &L1BlockRef) -> Self {
        if next_origin.timestamp <= config.block_time + l2_head.timestamp {
            return Self::Skip(SkipReason::TooEarly);
        }
        if next_origin.id.number <= config.genesis.l1.number {
            return Self::Skip(SkipReason::BeforeGenesis);
        }
        Self::Produce
    }
}

/// The result of a block production request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum ProductionOutcome {
    /// No block was built.
    Skipped(SkipReason),
    /// A new unsafe block was built. `catch_up` is set if another block is due right away.
    Produced { head: L2BlockRef, catch_up: bool },
}

/// Find the L1 origin for the next L2 block.
///
/// If the unsafe head is already anchored to the L1 head there is nothing newer, and
/// the L1 head is returned. Otherwise the next L1 block is used once the next L2 block
/// is due at or after the current origin's time.
pub async fn find_next_l1_origin<L: L1Chain + ?Sized>(
    l1: &L,
    l1_head: &L1BlockRef,
    l2_head: &L2BlockRef,
    block_time: u64,
) -> Result<L1BlockRef, ChainError> {
    if l2_head.l1_origin.hash == l1_head.hash() {
        return Ok(*l1_head);
    }

    let current = l1.ref_by_hash(l2_head.l1_origin.hash).await?;

    if l2_head.timestamp + block_time >= current.timestamp {
        let next = l1.ref_by_number(current.number() + 1).await?;
        debug!(current = %current.id, next = %next.id, "Moving to the next L1 origin");
        return Ok(next);
    }

    Ok(current)
}

/// Build the next unsafe block and dispatch its batch for submission.
///
/// The batch is submitted on a detached task that only owns copies of the config and
/// the batch. Submission failures are logged there and never reach the driver.
pub(crate) async fn produce_block<L1, P, S>(
    state: &mut DriverState,
    config: &RollupConfig,
    l1: &L1,
    pipeline: &P,
    submitter: &Arc<S>,
) -> Result<ProductionOutcome, DriverError>
where
    L1: L1Chain + ?Sized,
    P: OutputPipeline + ?Sized,
    S: BatchSubmitter + 'static,
{
    let next_origin =
        find_next_l1_origin(l1, &state.l1_head, &state.l2_head, config.block_time).await?;

    if let ProductionGate::Skip(reason) = ProductionGate::check(config, &state.l2_head, &next_origin)
    {
        trace!(%reason, l2_head = %state.l2_head.summary(), origin = %next_origin.id, "Skipping block production");
        DriverMetrics::increment_skipped_blocks(reason);
        return Ok(ProductionOutcome::Skipped(reason));
    }

    let start = Instant::now();
    let (head, batch) = pipeline
        .new_block(state.l2_finalized, state.l2_head, state.l2_safe_head.id, next_origin.id)
        .await?;
    DriverMetrics::record_block_building_time(start.elapsed());
    DriverMetrics::increment_l2_blocks_built();

    state.l2_head = head;
    info!(head = %head.summary(), "🔨 Built new L2 block");

    submission::dispatch_batch(Arc::clone(submitter), config.clone(), batch);

    let catch_up = next_origin.timestamp > head.timestamp + config.block_time;
    if catch_up {
        trace!(l2_head = %head.summary(), "Next block is due right away");
        DriverMetrics::increment_catch_up_blocks();
    }

    Ok(ProductionOutcome::Produced { head, catch_up })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::B256;
    use rollup_primitives::BlockId;

    use super::*;
    use crate::test_utils::{
        MockL1Chain, MockPipeline, MockSubmitter, l1_block, l1_chain, l2_block, l2_id,
        rollup_config,
    };

    #[tokio::test]
    async fn origin_unchanged_when_anchored_to_the_l1_head() {
        let l1 = MockL1Chain::new(l1_chain(0, 100..=105));
        let l1_head = l1_block(0, 105);
        let l2_head = l2_block(10, l1_head.id);

        let next = find_next_l1_origin(&l1, &l1_head, &l2_head, 2).await.unwrap();

        assert_eq!(next, l1_head);
        assert!(l1.hash_queries().is_empty());
        assert!(l1.number_queries().is_empty());
    }

    #[tokio::test]
    async fn next_origin_fetched_when_l2_reaches_the_current_origin_time() {
        // l2_head.time = 100, block_time = 2, current_origin.time = 99: 102 >= 99
        let current = L1BlockRef::new(B256::with_last_byte(50), 50, B256::with_last_byte(49), 99);
        let next = L1BlockRef::new(B256::with_last_byte(51), 51, current.hash(), 111);
        let l1_head = L1BlockRef::new(B256::with_last_byte(52), 52, next.hash(), 123);
        let l1 = MockL1Chain::new(vec![current, next, l1_head]);
        let l2_head = L2BlockRef::new(l2_id(7), 100, current.id);

        let found = find_next_l1_origin(&l1, &l1_head, &l2_head, 2).await.unwrap();

        assert_eq!(found, next);
        assert_ne!(found, current);
        assert_eq!(l1.hash_queries(), vec![current.hash()]);
        assert_eq!(l1.number_queries(), vec![51]);
    }

    #[tokio::test]
    async fn current_origin_kept_while_l2_is_behind_its_time() {
        // l2_head.time = 90, block_time = 2, current_origin.time = 99: 92 < 99
        let current = L1BlockRef::new(B256::with_last_byte(50), 50, B256::with_last_byte(49), 99);
        let l1_head = L1BlockRef::new(B256::with_last_byte(51), 51, current.hash(), 111);
        let l1 = MockL1Chain::new(vec![current, l1_head]);
        let l2_head = L2BlockRef::new(l2_id(7), 90, current.id);

        let found = find_next_l1_origin(&l1, &l1_head, &l2_head, 2).await.unwrap();

        assert_eq!(found, current);
        assert!(l1.number_queries().is_empty());
    }

    #[test]
    fn gate_rejects_early_and_pre_genesis_origins() {
        let cfg = rollup_config();
        let l2_head = l2_block(0, l1_block(0, 100).id);

        // Next origin not later than one block time after the head
        let mut origin = l1_block(0, 101);
        origin.timestamp = l2_head.timestamp + cfg.block_time;
        assert_eq!(
            ProductionGate::check(&cfg, &l2_head, &origin),
            ProductionGate::Skip(SkipReason::TooEarly)
        );

        let mut origin = l1_block(0, 100);
        origin.timestamp = l2_head.timestamp + 10;
        assert_eq!(
            ProductionGate::check(&cfg, &l2_head, &origin),
            ProductionGate::Skip(SkipReason::BeforeGenesis)
        );

        let mut origin = l1_block(0, 101);
        origin.timestamp = l2_head.timestamp + 10;
        assert!(ProductionGate::check(&cfg, &l2_head, &origin).is_produce());

        assert_eq!(SkipReason::TooEarly.to_string(), "TooEarly");
        assert_eq!(SkipReason::BeforeGenesis.to_string(), "BeforeGenesis");
    }

    #[tokio::test]
    async fn pre_genesis_origin_never_builds() {
        let cfg = rollup_config();
        // The L2 head is anchored to a pre-genesis L1 block, far behind in time
        let l1 = MockL1Chain::new(l1_chain(0, 95..=100));
        let l1_head = l1_block(0, 100);
        let l2_head = L2BlockRef::new(l2_id(0), 0, l1_block(0, 98).id);
        let mut state = DriverState::new(l1_head, l2_head, BlockId::default());
        let pipeline = MockPipeline::default();
        let (submitter, mut batches) = MockSubmitter::new();

        let outcome =
            produce_block(&mut state, &cfg, &l1, &pipeline, &Arc::new(submitter)).await.unwrap();

        assert_eq!(outcome, ProductionOutcome::Skipped(SkipReason::BeforeGenesis));
        assert!(pipeline.new_block_calls().is_empty());
        assert_eq!(state.l2_head, l2_head);
        assert!(batches.try_recv().is_err());
    }

    #[tokio::test]
    async fn produced_block_becomes_the_unsafe_head_and_is_submitted() {
        let cfg = rollup_config();
        let l1 = MockL1Chain::new(l1_chain(0, 100..=102));
        let l1_head = l1_block(0, 102);
        // Anchored to 101 (ts 1212), L2 head at ts 1212: next origin is 102 (ts 1224)
        let l2_head = L2BlockRef::new(l2_id(6), 1212, l1_block(0, 101).id);
        let mut state = DriverState::new(l1_head, l2_head, BlockId::default());
        let pipeline = MockPipeline::default();
        let (submitter, mut batches) = MockSubmitter::new();

        let outcome =
            produce_block(&mut state, &cfg, &l1, &pipeline, &Arc::new(submitter)).await.unwrap();

        let ProductionOutcome::Produced { head, catch_up } = outcome else {
            panic!("expected a block, got {outcome:?}");
        };
        assert_eq!(state.l2_head, head);
        assert_eq!(head.l1_origin, l1_block(0, 102).id);
        assert_eq!(pipeline.new_block_calls(), vec![l1_block(0, 102).id]);
        // 1224 > 1214 + 2
        assert!(catch_up);

        let batch = tokio::time::timeout(Duration::from_secs(1), batches.recv()).await.unwrap();
        assert_eq!(batch.map(|b| b.parent_hash), Some(l2_head.id.hash));
    }

    #[tokio::test]
    async fn build_failure_keeps_the_unsafe_head() {
        let cfg = rollup_config();
        let l1 = MockL1Chain::new(l1_chain(0, 100..=102));
        let l2_head = L2BlockRef::new(l2_id(6), 1212, l1_block(0, 101).id);
        let mut state = DriverState::new(l1_block(0, 102), l2_head, BlockId::default());
        let pipeline = MockPipeline::default();
        pipeline.set_failing(true);
        let (submitter, mut batches) = MockSubmitter::new();

        let err = produce_block(&mut state, &cfg, &l1, &pipeline, &Arc::new(submitter))
            .await
            .unwrap_err();

        assert!(matches!(err, DriverError::Derivation(_)));
        assert_eq!(state.l2_head, l2_head);
        assert!(batches.try_recv().is_err());
    }
}
