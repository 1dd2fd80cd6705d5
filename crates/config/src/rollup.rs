use std::path::PathBuf;

use clap::Parser;
use rollup_primitives::{RollupConfig, RollupConfigError};

/// Rollup and driver-related configuration options
#[derive(Debug, Clone, Parser)]
pub struct RollupOpts {
    /// Path to the JSON rollup configuration file (block time, sequencing window, genesis)
    #[clap(long = "rollup.config", env = "ROLLUP_CONFIG_PATH")]
    pub config_path: PathBuf,
    /// Run the driver as the sequencer, producing new unsafe L2 blocks. If unset, the driver
    /// runs as a follower and only derives the safe chain from L1.
    #[clap(long = "driver.sequencer", env = "ROLLUP_DRIVER_SEQUENCER", default_value_t = false)]
    pub sequencer: bool,
}

impl RollupOpts {
    /// Read and validate the rollup configuration file.
    pub fn load(&self) -> Result<RollupConfig, RollupConfigError> {
        RollupConfig::from_file(&self.config_path)
    }
}
