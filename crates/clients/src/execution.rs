use std::time::Duration;

use alloy::{
    rpc::{
        client::{ClientBuilder, RpcClient},
        types::BlockNumberOrTag,
    },
    transports::{TransportErrorKind, TransportResult},
};
use alloy_primitives::{B256, U64};
use rollup_primitives::{L1BlockRef, summary::Summary};
use serde::Deserialize;
use tokio::{sync::mpsc, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, trace, warn};
use url::Url;

/// The header fields the driver needs from an `eth_getBlockBy*` response.
///
/// Transactions are never requested, and every other header field is ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcHeaderRef {
    hash: B256,
    parent_hash: B256,
    number: U64,
    timestamp: U64,
}

impl From<RpcHeaderRef> for L1BlockRef {
    fn from(header: RpcHeaderRef) -> Self {
        Self::new(header.hash, header.number.to(), header.parent_hash, header.timestamp.to())
    }
}

/// An HTTP-based JSON-RPC client for the L1 execution node.
///
/// Only exposes the block lookups required by the driver, returning [`L1BlockRef`]s.
#[derive(Clone, Debug)]
pub struct L1Client {
    rpc: RpcClient,
}

impl L1Client {
    /// Create a new [`L1Client`] with the given HTTP URL.
    pub fn new<U: Into<Url>>(http_url: U) -> Self {
        let rpc = ClientBuilder::default().http(http_url.into());
        Self { rpc }
    }

    /// Get the block reference with the given number. If `None`, the latest block is returned.
    pub async fn header_ref(&self, block_number: Option<u64>) -> TransportResult<L1BlockRef> {
        let tag = block_number.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number);

        let header: Option<RpcHeaderRef> =
            self.rpc.request("eth_getBlockByNumber", (tag, false)).await?;
        header
            .map(Into::into)
            .ok_or_else(|| TransportErrorKind::custom_str(&format!("Block not found: {}", tag)))
    }

    /// Get the block reference with the given hash.
    pub async fn header_ref_by_hash(&self, hash: B256) -> TransportResult<L1BlockRef> {
        let header: Option<RpcHeaderRef> =
            self.rpc.request("eth_getBlockByHash", (hash, false)).await?;
        header
            .map(Into::into)
            .ok_or_else(|| TransportErrorKind::custom_str(&format!("Block not found: {}", hash)))
    }

    /// Get the latest block number.
    pub async fn get_head(&self) -> TransportResult<u64> {
        let result: U64 = self.rpc.request("eth_blockNumber", ()).await?;

        Ok(result.to())
    }
}

/// Polls the L1 execution node for new head blocks and forwards them to a channel.
///
/// A head is forwarded only when its hash differs from the last forwarded one, so both
/// linear extensions and reorgs reach the receiver, while repeated polls of the same
/// head do not.
#[derive(Debug)]
pub struct L1HeadPoller {
    client: L1Client,
    interval: Duration,
}

impl L1HeadPoller {
    /// The capacity of the head updates channel.
    pub const CHANNEL_CAPACITY: usize = 64;

    /// Create a new [`L1HeadPoller`].
    pub const fn new(client: L1Client, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Spawn the polling task. Returns the receiver of new heads and the task handle.
    ///
    /// The task exits once the receiver is dropped.
    pub fn spawn(self) -> (mpsc::Receiver<L1BlockRef>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(Self::CHANNEL_CAPACITY);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = None;

            loop {
                interval.tick().await;

                let head = match self.client.header_ref(None).await {
                    Ok(head) => head,
                    Err(e) => {
                        warn!(?e, "Failed to poll the L1 head");
                        continue;
                    }
                };

                if last == Some(head.hash()) {
                    trace!(num = head.number(), "L1 head unchanged");
                    continue;
                }

                debug!(head = %head.summary(), "Polled new L1 head");
                last = Some(head.hash());

                if tx.send(head).await.is_err() {
                    error!("L1 head receiver dropped, stopping the poller");
                    return;
                }
            }
        });

        (rx, handle)
    }
}
