use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

use crate::metrics::DriverMetrics;

/// A coalescing request queue with room for a single pending request.
///
/// Firing while a request is already pending is a no-op, so any burst of fires
/// results in exactly one request being observed by the consumer.
#[derive(Debug)]
pub(crate) struct Trigger {
    kind: &'static str,
    tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<()>,
}

impl Trigger {
    /// Create a new [`Trigger`]. `kind` labels logs and metrics.
    pub(crate) fn new(kind: &'static str) -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self { kind, tx, rx }
    }

    /// Post a request. Returns false if it was absorbed by a pending one.
    pub(crate) fn fire(&self) -> bool {
        post(self.kind, &self.tx)
    }

    /// Post a request from a detached task once `delay` has elapsed.
    ///
    /// The request coalesces like any other, and is dropped if the trigger is gone by then.
    pub(crate) fn fire_after(&self, delay: Duration) {
        let (kind, tx) = (self.kind, self.tx.clone());

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            post(kind, &tx);
        });
    }

    /// Wait for the next pending request.
    ///
    /// Never resolves to `None` since the trigger owns its own sender.
    pub(crate) async fn requested(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

fn post(kind: &'static str, tx: &mpsc::Sender<()>) -> bool {
    match tx.try_send(()) {
        Ok(()) => true,
        Err(TrySendError::Full(())) => {
            trace!(kind, "Request already pending");
            DriverMetrics::increment_coalesced_requests(kind);
            false
        }
        Err(TrySendError::Closed(())) => false,
    }
}
