#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Rollup node driver
//!
//! The driver reconciles the L2 chain against a continuously updating L1 chain:
//! - Tracking the L1 head and recovering from L1 reorgs
//! - Deriving safe L2 blocks from L1 sequencing windows, as a follower
//! - Producing new unsafe L2 blocks and submitting their batches, as the sequencer

/// The main driver module with the core event loop.
mod driver;
pub use driver::{Driver, DriverError, DriverHandle, STEP_RETRY_DELAY};

/// The external collaborators of the driver: chain backends, output pipeline and batch submitter.
mod traits;
pub use traits::{
    BatchSubmitter, ChainError, L1Chain, L2Chain, OutputPipeline, PipelineError, SubmissionError,
};

/// The driver configuration.
mod config;
pub use config::DriverConfig;

/// The driver role.
mod role;
pub use role::Role;

/// The driver state containers.
mod state;
pub use state::SyncStatus;

/// The buffer of L1 blocks used to derive the next epochs.
mod window;
pub use window::L1Window;

/// L1 reorg detection and resolution.
mod reorg;
pub use reorg::{HeadUpdate, ReorgError, ReorgResolution, find_l1_reorg_base, resolve_reorg};

/// Recovery of the L2 heads after an L1 reorg.
mod sync;
pub use sync::{SyncError, find_safe_l2_head, find_unsafe_l2_head};

/// The epoch handler, deriving safe blocks one sequencing window at a time.
mod epoch;
pub use epoch::{ReorgType, StepOutcome};

/// The block production path of the sequencer.
mod sequencer;
pub use sequencer::{ProductionGate, ProductionOutcome, SkipReason, find_next_l1_origin};

/// Detached batch submission.
mod submission;

/// Coalescing request triggers.
mod trigger;

/// Helper functions and the JSON-RPC L1 backend.
mod helpers;
pub use helpers::MAX_L1_RANGE;

/// The metrics for the driver.
mod metrics;

#[cfg(test)]
mod test_utils;
