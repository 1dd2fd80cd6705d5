use std::time::Duration;

use derive_more::derive::Deref;
use rollup_config::Opts;
use rollup_primitives::{RollupConfig, RollupConfigError, summary::Summary, time::BlockTicker};

use crate::role::Role;

/// The runtime configuration of the driver.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct DriverConfig {
    /// The rollup configuration, accessible as dereferenced fields.
    #[deref]
    pub rollup: RollupConfig,
    /// The role of this driver.
    pub role: Role,
}

impl DriverConfig {
    /// Create a new [`DriverConfig`].
    pub const fn new(rollup: RollupConfig, role: Role) -> Self {
        Self { rollup, role }
    }

    /// Create a new [`DriverConfig`] from the CLI options, reading the rollup config file.
    pub fn from_opts(opts: &Opts) -> Result<Self, RollupConfigError> {
        let rollup = opts.rollup.load()?;
        Ok(Self::new(rollup, Role::from_sequencer_flag(opts.rollup.sequencer)))
    }

    /// Returns the L2 block time as a [`Duration`].
    pub const fn block_period(&self) -> Duration {
        Duration::from_secs(self.rollup.block_time)
    }

    /// Creates the block production ticker. Only sequencers get an enabled one.
    pub(crate) fn block_ticker(&self) -> BlockTicker {
        if self.role.can_sequence() {
            BlockTicker::new(self.block_period())
        } else {
            BlockTicker::disabled()
        }
    }
}

impl Summary for DriverConfig {
    fn summary(&self) -> String {
        format!("Running as {} with rollup config: {}", self.role, self.rollup.summary())
    }
}
