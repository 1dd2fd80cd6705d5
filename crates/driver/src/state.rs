use rollup_primitives::{BlockId, L1BlockRef, L2BlockRef};

use crate::{metrics::DriverMetrics, window::L1Window};

/// The chain state tracked by the driver.
///
/// Owned exclusively by the event loop task, other tasks only ever see
/// [`SyncStatus`] snapshots of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DriverState {
    /// The latest recorded head of the L1 chain.
    pub l1_head: L1BlockRef,
    /// The L2 unsafe head.
    pub l2_head: L2BlockRef,
    /// The L2 safe head, derived from L1 data.
    pub l2_safe_head: L2BlockRef,
    /// The L2 block that will never be reverted.
    pub l2_finalized: BlockId,
    /// The buffered L1 blocks after the safe head's L1 origin.
    pub l1_window: L1Window,
}

impl DriverState {
    /// Create the initial state. The safe head starts at the unsafe head and the window is empty.
    pub(crate) fn new(l1_head: L1BlockRef, l2_head: L2BlockRef, l2_finalized: BlockId) -> Self {
        Self { l1_head, l2_head, l2_safe_head: l2_head, l2_finalized, l1_window: L1Window::new() }
    }

    /// The block the window continues from when it is empty.
    pub(crate) const fn window_base(&self) -> BlockId {
        self.l2_safe_head.l1_origin
    }

    /// The amount of L1 blocks between the L1 head and the L1 origin of the unsafe head.
    pub(crate) const fn l1_origin_lag(&self) -> u64 {
        self.l1_head.id.number.saturating_sub(self.l2_head.l1_origin.number)
    }

    /// Returns true if at least a full sequencing window of L1 blocks is ahead of the unsafe head.
    pub(crate) const fn is_window_behind(&self, seq_window_size: u64) -> bool {
        self.l1_origin_lag() >= seq_window_size
    }

    /// Take a read-only snapshot of the state.
    pub(crate) fn status(&self) -> SyncStatus {
        SyncStatus {
            l1_head: self.l1_head,
            unsafe_l2: self.l2_head,
            safe_l2: self.l2_safe_head,
            finalized_l2: self.l2_finalized,
            window_len: self.l1_window.len(),
        }
    }

    /// Export the state as metrics.
    pub(crate) fn record_metrics(&self) {
        DriverMetrics::set_l1_head_number(self.l1_head.number());
        DriverMetrics::set_unsafe_head_number(self.l2_head.number());
        DriverMetrics::set_safe_head_number(self.l2_safe_head.number());
        DriverMetrics::set_head_l1_origin(self.l2_head.l1_origin.number);
        DriverMetrics::set_l1_origin_lag(self.l1_origin_lag());
        DriverMetrics::set_window_len(self.l1_window.len());
    }
}

/// A snapshot of the driver state, published after every processed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStatus {
    /// The latest recorded head of the L1 chain.
    pub l1_head: L1BlockRef,
    /// The L2 unsafe head.
    pub unsafe_l2: L2BlockRef,
    /// The L2 safe head.
    pub safe_l2: L2BlockRef,
    /// The L2 finalized block.
    pub finalized_l2: BlockId,
    /// The amount of L1 blocks buffered in the window.
    pub window_len: usize,
}
