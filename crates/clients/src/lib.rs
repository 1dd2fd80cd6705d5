#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Client connections to the chains the rollup driver follows.

/// Execution layer client connection
pub mod execution;
pub use execution::{L1Client, L1HeadPoller};
