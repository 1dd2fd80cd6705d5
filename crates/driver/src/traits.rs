use alloy::transports::TransportError;
use alloy_primitives::B256;
use async_trait::async_trait;
use rollup_primitives::{BatchData, BlockId, L1BlockRef, L2BlockRef, RollupConfig};

/// An error returned by a chain query backend.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Block not found: {0}")]
    NotFound(String),
    #[error("Non-contiguous L1 range: expected block {expected}, got {got}")]
    NonContiguous { expected: u64, got: u64 },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Chain error: {0}")]
    Custom(String),
}

/// An error returned by the output pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to derive from the sequencing window: {0}")]
    Derivation(String),
    #[error("Failed to build a new block: {0}")]
    BlockBuilding(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// An error returned by the batch submitter.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Batch rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Read access to the layer-1 chain.
#[async_trait]
pub trait L1Chain: Send + Sync {
    /// Returns the current head of the chain.
    async fn head_ref(&self) -> Result<L1BlockRef, ChainError>;

    /// Returns the canonical block at the given height.
    async fn ref_by_number(&self, number: u64) -> Result<L1BlockRef, ChainError>;

    /// Returns the block with the given hash, canonical or not.
    async fn ref_by_hash(&self, hash: B256) -> Result<L1BlockRef, ChainError>;

    /// Returns the canonical blocks after `base`, in ascending order, without gaps.
    async fn range_after(&self, base: BlockId) -> Result<Vec<BlockId>, ChainError>;
}

/// Read access to the layer-2 chain.
#[async_trait]
pub trait L2Chain: Send + Sync {
    /// Returns the block at the given height, or the latest block if `None`.
    async fn ref_by_number(&self, number: Option<u64>) -> Result<L2BlockRef, ChainError>;
}

/// The derivation and block building pipeline.
#[async_trait]
pub trait OutputPipeline: Send + Sync {
    /// Derives the next safe block from a full sequencing window.
    async fn step(
        &self,
        safe_head: L2BlockRef,
        finalized: BlockId,
        unsafe_head: BlockId,
        window: &[BlockId],
    ) -> Result<L2BlockRef, PipelineError>;

    /// Builds a new unsafe block on top of `unsafe_head`, anchored to `l1_origin`.
    async fn new_block(
        &self,
        finalized: BlockId,
        unsafe_head: L2BlockRef,
        safe_head: BlockId,
        l1_origin: BlockId,
    ) -> Result<(L2BlockRef, BatchData), PipelineError>;
}

/// Submits batches to the layer-1 chain.
#[async_trait]
pub trait BatchSubmitter: Send + Sync {
    /// Submits the batches, returning the hash of the submission transaction.
    async fn submit(
        &self,
        config: &RollupConfig,
        batches: Vec<BatchData>,
    ) -> Result<B256, SubmissionError>;
}
