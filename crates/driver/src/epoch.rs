use std::time::Instant;

use derive_more::derive::IsVariant;
use rollup_primitives::{L2BlockRef, summary::Summary};
use tracing::{debug, trace};

use crate::{
    driver::DriverError,
    metrics::DriverMetrics,
    state::DriverState,
    traits::{L1Chain, OutputPipeline},
};

/// The kind of L2 reorg caused by a derivation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IsVariant)]
pub enum ReorgType {
    /// The derived block extends the chain.
    #[default]
    None,
    /// The derived block replaces part of the unsafe chain.
    Shallow,
    /// The derived block replaces part of the safe chain.
    Deep,
}

/// The result of a derivation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum StepOutcome {
    /// Not enough L1 blocks are buffered for a full sequencing window.
    Idle,
    /// A new safe block was derived.
    Advanced { head: L2BlockRef, safe_head: L2BlockRef, reorg: ReorgType },
}

/// Derive the next L2 epoch from the next sequencing window.
///
/// On success the derived block becomes both the unsafe and the safe head, and the
/// leading window entry is evicted. Unsafe blocks ahead of the safe head are not
/// tracked here, so [`StepOutcome::Advanced`] always reports [`ReorgType::None`]: L1
/// reorgs are handled on head updates instead.
///
/// On error the heads are left unchanged.
pub(crate) async fn handle_epoch<L1, P>(
    state: &mut DriverState,
    l1: &L1,
    pipeline: &P,
    seq_window_size: u64,
) -> Result<StepOutcome, DriverError>
where
    L1: L1Chain + ?Sized,
    P: OutputPipeline + ?Sized,
{
    trace!(
        l2_head = %state.l2_head.summary(),
        l2_safe_head = %state.l2_safe_head.summary(),
        l1_base = %state.window_base(),
        "Handling epoch"
    );

    if state.l1_window.len() < seq_window_size as usize {
        let base = state.window_base();
        let appended = state.l1_window.extend(l1, base).await?;
        trace!(appended, cached = state.l1_window.len(), "Extended the L1 window");
    }

    let Some(window) = state.l1_window.sequencing_window(seq_window_size) else {
        trace!(cached = state.l1_window.len(), "Not enough cached blocks to run a step");
        return Ok(StepOutcome::Idle);
    };

    let start = Instant::now();
    let derived = pipeline
        .step(state.l2_safe_head, state.l2_finalized, state.l2_head.id, window)
        .await?;
    DriverMetrics::record_epoch_step_time(start.elapsed());

    state.l1_window.advance();
    state.l2_head = derived;
    state.l2_safe_head = derived;

    debug!(safe_head = %derived.summary(), "Derived new safe head");

    Ok(StepOutcome::Advanced { head: derived, safe_head: derived, reorg: ReorgType::None })
}
