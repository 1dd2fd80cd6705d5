use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use rollup_primitives::{L1BlockRef, RollupConfig, summary::Summary};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::{JoinError, JoinHandle},
};
use tokio_stream::StreamExt;
use tracing::{debug, error, info, trace, warn};

use crate::{
    config::DriverConfig,
    epoch::{self, StepOutcome},
    metrics::DriverMetrics,
    reorg::{self, HeadUpdate, ReorgError},
    role::Role,
    sequencer::{self, ProductionOutcome},
    state::{DriverState, SyncStatus},
    traits::{BatchSubmitter, ChainError, L1Chain, L2Chain, OutputPipeline, PipelineError},
    trigger::Trigger,
};

/// How long to wait before retrying a derivation step that made no progress.
pub const STEP_RETRY_DELAY: Duration = Duration::from_millis(500);

/// The errors that can occur during the driver's operation.
/// Note that these errors won't halt the event loop once it has started.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Failed to retrieve chain data: {0}")]
    Retrieval(#[from] ChainError),
    #[error("Failed to resolve L1 reorg: {0}")]
    ReorgResolution(#[from] ReorgError),
    #[error("Output pipeline error: {0}")]
    Derivation(#[from] PipelineError),
    #[error("Failed to fetch the initial chain heads: {0}")]
    Startup(#[source] ChainError),
    #[error("Driver task failed: {0}")]
    Task(#[from] JoinError),
}

/// Rollup node driver.
///
/// The driver owns the chain state and runs the main event loop, responsible for:
/// - Tracking the L1 head and recovering from L1 reorgs
/// - Deriving safe L2 blocks from L1 sequencing windows, as a follower
/// - Producing new unsafe L2 blocks and submitting their batches, as the sequencer
#[derive(Debug)]
pub struct Driver<L1, L2, P, S> {
    /// Driver runtime configuration.
    cfg: DriverConfig,
    /// Layer 1 chain backend.
    l1: L1,
    /// Layer 2 chain backend.
    l2: L2,
    /// Derivation and block building pipeline.
    pipeline: P,
    /// Batch submitter, shared with the detached submission tasks.
    submitter: Arc<S>,
    /// Chain state, owned by the event loop.
    state: DriverState,
    /// Pending derivation step request.
    step: Trigger,
    /// Pending block production request.
    produce: Trigger,
    /// Publishes a snapshot of the state after every event.
    status_tx: watch::Sender<SyncStatus>,
}

/// A handle to a running [`Driver`].
///
/// Dropping the handle stops the driver, like [`DriverHandle::close`].
#[derive(Debug)]
pub struct DriverHandle {
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<SyncStatus>,
    task: JoinHandle<()>,
}

impl DriverHandle {
    /// Signal the event loop to stop. Calling it more than once has no further effect.
    pub fn close(&self) {
        self.shutdown.send_replace(true);
    }

    /// Wait for the event loop to exit.
    pub async fn closed(self) -> Result<(), DriverError> {
        let Self { shutdown, task, .. } = self;
        task.await?;
        drop(shutdown);
        Ok(())
    }

    /// Subscribe to the state snapshots published by the event loop.
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Returns the latest published state snapshot.
    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }
}

impl<L1, L2, P, S> Driver<L1, L2, P, S>
where
    L1: L1Chain + 'static,
    L2: L2Chain + 'static,
    P: OutputPipeline + 'static,
    S: BatchSubmitter + 'static,
{
    /// Create a new [`Driver`] instance.
    pub fn new(
        config: RollupConfig,
        l1: L1,
        l2: L2,
        pipeline: P,
        submitter: S,
        role: Role,
    ) -> Self {
        Self::with_config(DriverConfig::new(config, role), l1, l2, pipeline, submitter)
    }

    /// Create a new [`Driver`] instance from a [`DriverConfig`].
    pub fn with_config(cfg: DriverConfig, l1: L1, l2: L2, pipeline: P, submitter: S) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::default());

        Self {
            cfg,
            l1,
            l2,
            pipeline,
            submitter: Arc::new(submitter),
            state: DriverState::default(),
            step: Trigger::new("step"),
            produce: Trigger::new("produce"),
            status_tx,
        }
    }

    /// Fetch the initial chain heads and spawn the event loop.
    ///
    /// The safe head starts at the unsafe head, the finalized block at the L2 genesis,
    /// and the window empty. Fails without spawning anything if the heads can't be fetched.
    pub async fn start(
        mut self,
        l1_heads: mpsc::Receiver<L1BlockRef>,
    ) -> Result<DriverHandle, DriverError> {
        info!("{}", self.cfg.summary());

        let l1_head = self.l1.head_ref().await.map_err(DriverError::Startup)?;
        let l2_head = self.l2.ref_by_number(None).await.map_err(DriverError::Startup)?;

        self.state = DriverState::new(l1_head, l2_head, self.cfg.genesis.l2);
        info!(l1_head = %l1_head.summary(), l2_head = %l2_head.summary(), "Fetched initial chain heads");

        DriverMetrics::set_driver_version(env!("CARGO_PKG_VERSION").to_owned());
        DriverMetrics::set_driver_role(self.cfg.role);
        self.publish_status();

        let (shutdown, shutdown_rx) = watch::channel(false);
        let status = self.status_tx.subscribe();
        let task = tokio::spawn(self.run(l1_heads, shutdown_rx));

        Ok(DriverHandle { shutdown, status, task })
    }

    /// The driver event loop. Runs until the handle is closed or dropped.
    async fn run(
        mut self,
        mut l1_heads: mpsc::Receiver<L1BlockRef>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut block_ticker = self.cfg.block_ticker();
        let mut heads_open = true;

        info!(role = %self.cfg.role, "🚀 Starting driver event loop");
        self.step.fire();

        loop {
            tokio::select! {
                biased;

                res = shutdown.changed() => {
                    if res.is_err() || *shutdown.borrow() {
                        info!("Driver event loop stopped");
                        return;
                    }
                }

                Some(_) = block_ticker.next() => {
                    trace!("L2 block production tick");
                    self.produce.fire();
                }

                Some(()) = self.produce.requested() => {
                    self.on_production_request().await;
                }

                head = l1_heads.recv(), if heads_open => {
                    match head {
                        Some(head) => self.on_l1_head(head).await,
                        None => {
                            warn!("L1 head channel closed, no more L1 updates");
                            heads_open = false;
                        }
                    }
                }

                Some(()) = self.step.requested() => {
                    self.on_step_request().await;
                }
            }

            self.publish_status();
        }
    }

    /// Handle a block production request. Only sequencers build blocks.
    async fn on_production_request(&mut self) {
        if !self.cfg.role.can_sequence() {
            trace!("Ignoring block production request as follower");
            return;
        }

        let res = sequencer::produce_block(
            &mut self.state,
            &self.cfg.rollup,
            &self.l1,
            &self.pipeline,
            &self.submitter,
        )
        .await;

        match res {
            Ok(ProductionOutcome::Produced { catch_up: true, .. }) => {
                self.produce.fire();
            }
            Ok(_) => {}
            Err(e) => {
                error!(?e, l2_head = %self.state.l2_head.summary(), "Could not extend the chain as sequencer");
                DriverMetrics::increment_block_production_failures(e.to_string());
            }
        }
    }

    /// Handle a new L1 head, extending the window or recovering from a reorg.
    async fn on_l1_head(&mut self, new_head: L1BlockRef) {
        trace!(new_head = %new_head.id, old_head = %self.state.l1_head.id, "Received new L1 head");

        match HeadUpdate::classify(&self.state.l1_head, &new_head) {
            HeadUpdate::Unchanged => {
                trace!(l1_head = %new_head.id, "L1 head is unchanged");
            }
            HeadUpdate::Extension => {
                self.state.l1_head = new_head;
                // Only derivation consumes the window
                if self.cfg.role.can_derive() {
                    let base = self.state.window_base();
                    let appended =
                        self.state.l1_window.push_if_extends(base, new_head.parent, new_head.id);
                    debug!(l1_head = %new_head.id, appended, "L1 head extended");
                } else {
                    debug!(l1_head = %new_head.id, "L1 head extended");
                }
            }
            HeadUpdate::Reorg => {
                warn!(
                    old_l1_head = %self.state.l1_head.summary(),
                    new_l1_head = %new_head.summary(),
                    "L1 head update indicates an L1 reorg"
                );

                let start = Instant::now();
                let res = reorg::resolve_reorg(
                    &self.l1,
                    &self.l2,
                    &self.cfg.rollup,
                    new_head,
                    self.state.l2_head,
                )
                .await;

                match res {
                    Ok(resolution) => {
                        DriverMetrics::record_reorg_resolution_time(start.elapsed());
                        DriverMetrics::increment_l1_reorgs(
                            self.state.l1_head.number().saturating_sub(resolution.base.number),
                        );
                        resolution.apply(&mut self.state);
                        info!(
                            base = %resolution.base,
                            l2_head = %resolution.l2_head.summary(),
                            l2_safe_head = %resolution.l2_safe_head.summary(),
                            "Resolved L1 reorg"
                        );
                    }
                    Err(e) => {
                        error!(?e, "Could not resolve L1 reorg, keeping the current heads");
                        DriverMetrics::increment_reorg_resolution_failures(e.to_string());
                        return;
                    }
                }
            }
        }

        if self.state.is_window_behind(self.cfg.seq_window_size) {
            self.step.fire();
        }
    }

    /// Handle a derivation step request. Only followers derive.
    async fn on_step_request(&mut self) {
        if !self.cfg.role.can_derive() {
            trace!("Skipping derivation step as sequencer");
            return;
        }

        trace!("Got step request");
        let res = epoch::handle_epoch(
            &mut self.state,
            &self.l1,
            &self.pipeline,
            self.cfg.seq_window_size,
        )
        .await;

        let advanced = match res {
            Ok(StepOutcome::Advanced { .. }) => {
                DriverMetrics::increment_epoch_steps();
                true
            }
            Ok(StepOutcome::Idle) => false,
            Err(e) => {
                error!(?e, "Error handling epoch");
                DriverMetrics::increment_epoch_step_failures(e.to_string());
                false
            }
        };

        if !self.state.is_window_behind(self.cfg.seq_window_size) {
            return;
        }

        if advanced {
            self.step.fire();
        } else {
            debug!(delay = ?STEP_RETRY_DELAY, "Still behind L1, retrying derivation step");
            self.step.fire_after(STEP_RETRY_DELAY);
        }
    }

    /// Publish the current state to the status subscribers and metrics.
    fn publish_status(&self) {
        self.state.record_metrics();
        self.status_tx.send_replace(self.state.status());
    }
}
