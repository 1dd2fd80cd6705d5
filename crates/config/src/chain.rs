use std::time::Duration;

use clap::Parser;
use url::Url;

/// L1-related configuration options
#[derive(Debug, Clone, Parser)]
pub struct L1Opts {
    /// The URL of the L1 execution client HTTP connection
    #[clap(long = "l1.rpc-url", env = "ROLLUP_L1_RPC_URL", id = "l1-rpc-url")]
    pub rpc_url: Url,
    /// The interval at which the L1 head is polled, in milliseconds
    #[clap(long = "l1.poll-interval-ms", env = "ROLLUP_L1_POLL_INTERVAL_MS", default_value_t = 4000)]
    pub poll_interval_ms: u64,
}

impl L1Opts {
    /// Returns the L1 head polling interval.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
