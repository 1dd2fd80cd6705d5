use std::{sync::Arc, time::Instant};

use rollup_primitives::{BatchData, RollupConfig, summary::Summary};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::{metrics::DriverMetrics, traits::BatchSubmitter};

/// Submit a batch on a detached task.
///
/// The task owns the config and the batch, and never touches the driver state.
/// Failures are logged and counted, retries are up to the submitter.
pub(crate) fn dispatch_batch<S>(
    submitter: Arc<S>,
    config: RollupConfig,
    batch: BatchData,
) -> JoinHandle<()>
where
    S: BatchSubmitter + 'static,
{
    tokio::spawn(async move {
        let summary = batch.summary();
        let start = Instant::now();

        match submitter.submit(&config, vec![batch]).await {
            Ok(tx_hash) => {
                DriverMetrics::record_batch_submission_time(start.elapsed());
                DriverMetrics::increment_batches_submitted();
                debug!(%tx_hash, batch = %summary, "📤 Batch submitted");
            }
            Err(e) => {
                error!(?e, batch = %summary, "Failed to submit batch");
                DriverMetrics::increment_batch_submission_failures(e.to_string());
            }
        }
    })
}
