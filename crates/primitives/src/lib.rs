#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Rollup driver primitive types, utilities and constants.

/// Block and chain reference types.
pub mod block;
pub use block::{BlockId, L1BlockRef, L2BlockRef};

/// Rollup configuration.
pub mod config;
pub use config::{Genesis, RollupConfig, RollupConfigError};

/// Batch data handed from the output pipeline to the batch submitter.
pub mod batch;
pub use batch::BatchData;

/// Time-related utilities.
pub mod time;

/// Utility for summarizing objects into a string for logging purposes.
pub mod summary;
