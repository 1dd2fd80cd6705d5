//! Mock collaborators and chain builders for driver tests.

use std::{
    collections::{BTreeMap, HashMap},
    ops::RangeInclusive,
    sync::{Arc, Mutex},
};

use alloy_primitives::B256;
use async_trait::async_trait;
use rollup_primitives::{BatchData, BlockId, Genesis, L1BlockRef, L2BlockRef, RollupConfig};
use tokio::sync::mpsc;

use crate::traits::{
    BatchSubmitter, ChainError, L1Chain, L2Chain, OutputPipeline, PipelineError, SubmissionError,
};

/// L1 block time used by the chain builders.
pub(crate) const L1_BLOCK_TIME: u64 = 12;

/// L2 block time of [`rollup_config`].
pub(crate) const BLOCK_TIME: u64 = 2;

/// L1 genesis block number of [`rollup_config`].
pub(crate) const GENESIS_L1: u64 = 100;

/// Fork byte used for L2 block hashes.
const L2_FORK: u8 = 0xee;

/// A deterministic block hash: the fork byte followed by the block number.
pub(crate) fn hash(fork: u8, number: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[0] = fork;
    bytes[24..].copy_from_slice(&number.to_be_bytes());
    B256::from(bytes)
}

/// An L1 block on the given fork, whose parent is on the same fork.
pub(crate) fn l1_block(fork: u8, number: u64) -> L1BlockRef {
    L1BlockRef::new(
        hash(fork, number),
        number,
        hash(fork, number.saturating_sub(1)),
        number * L1_BLOCK_TIME,
    )
}

/// A linear L1 chain on the given fork.
pub(crate) fn l1_chain(fork: u8, numbers: RangeInclusive<u64>) -> Vec<L1BlockRef> {
    numbers.map(|n| l1_block(fork, n)).collect()
}

/// `count` L1 blocks on the given fork, branching off `base`.
pub(crate) fn l1_fork(fork: u8, base: &L1BlockRef, count: u64) -> Vec<L1BlockRef> {
    let mut blocks = l1_chain(fork, base.number() + 1..=base.number() + count);
    if let Some(first) = blocks.first_mut() {
        first.parent = base.id;
    }
    blocks
}

/// The id of the L2 block at the given height.
pub(crate) fn l2_id(number: u64) -> BlockId {
    BlockId::new(hash(L2_FORK, number), number)
}

/// An L2 block at the given height and origin, timestamped from the L2 genesis time.
pub(crate) fn l2_block(number: u64, l1_origin: BlockId) -> L2BlockRef {
    L2BlockRef::new(l2_id(number), GENESIS_L1 * L1_BLOCK_TIME + number * BLOCK_TIME, l1_origin)
}

/// Block time 2s, sequencing window of 4 blocks, L1 genesis at block 100.
pub(crate) fn rollup_config() -> RollupConfig {
    RollupConfig {
        block_time: BLOCK_TIME,
        seq_window_size: 4,
        genesis: Genesis {
            l1: l1_block(0, GENESIS_L1).id,
            l2: l2_id(0),
            l2_time: GENESIS_L1 * L1_BLOCK_TIME,
        },
    }
}

fn mock_failure() -> ChainError {
    ChainError::Custom("mock failure".to_owned())
}

#[derive(Debug, Default)]
struct L1Inner {
    canonical: BTreeMap<u64, L1BlockRef>,
    by_hash: HashMap<B256, L1BlockRef>,
    range_override: Option<Vec<BlockId>>,
    failing: bool,
    number_queries: Vec<u64>,
    hash_queries: Vec<B256>,
}

/// An in-memory L1 chain. Clones share the same chain.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockL1Chain {
    inner: Arc<Mutex<L1Inner>>,
}

impl MockL1Chain {
    pub(crate) fn new(blocks: Vec<L1BlockRef>) -> Self {
        let chain = Self::default();
        chain.reorg(blocks);
        chain
    }

    /// Make `blocks` canonical, dropping every canonical block at or above the first one.
    pub(crate) fn reorg(&self, blocks: Vec<L1BlockRef>) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(first) = blocks.first() {
            let _ = inner.canonical.split_off(&first.number());
        }
        for block in blocks {
            inner.canonical.insert(block.number(), block);
            inner.by_hash.insert(block.hash(), block);
        }
    }

    /// Make `blocks` known by hash only, as a non-canonical branch.
    pub(crate) fn add_branch(&self, blocks: Vec<L1BlockRef>) {
        let mut inner = self.inner.lock().unwrap();
        for block in blocks {
            inner.by_hash.insert(block.hash(), block);
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }

    pub(crate) fn set_range_override(&self, range: Vec<BlockId>) {
        self.inner.lock().unwrap().range_override = Some(range);
    }

    pub(crate) fn number_queries(&self) -> Vec<u64> {
        self.inner.lock().unwrap().number_queries.clone()
    }

    pub(crate) fn hash_queries(&self) -> Vec<B256> {
        self.inner.lock().unwrap().hash_queries.clone()
    }
}

#[async_trait]
impl L1Chain for MockL1Chain {
    async fn head_ref(&self) -> Result<L1BlockRef, ChainError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(mock_failure());
        }
        inner
            .canonical
            .values()
            .next_back()
            .copied()
            .ok_or_else(|| ChainError::NotFound("head".to_owned()))
    }

    async fn ref_by_number(&self, number: u64) -> Result<L1BlockRef, ChainError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(mock_failure());
        }
        inner.number_queries.push(number);
        inner.canonical.get(&number).copied().ok_or_else(|| ChainError::NotFound(number.to_string()))
    }

    async fn ref_by_hash(&self, hash: B256) -> Result<L1BlockRef, ChainError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(mock_failure());
        }
        inner.hash_queries.push(hash);
        inner.by_hash.get(&hash).copied().ok_or_else(|| ChainError::NotFound(hash.to_string()))
    }

    async fn range_after(&self, base: BlockId) -> Result<Vec<BlockId>, ChainError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(mock_failure());
        }
        if let Some(range) = &inner.range_override {
            return Ok(range.clone());
        }
        Ok(inner.canonical.range(base.number + 1..).map(|(_, block)| block.id).collect())
    }
}

#[derive(Debug, Default)]
struct L2Inner {
    blocks: BTreeMap<u64, L2BlockRef>,
    failing: bool,
}

/// An in-memory L2 chain. Clones share the same chain.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockL2Chain {
    inner: Arc<Mutex<L2Inner>>,
}

impl MockL2Chain {
    pub(crate) fn new(blocks: Vec<L2BlockRef>) -> Self {
        let chain = Self::default();
        chain.inner.lock().unwrap().blocks = blocks.into_iter().map(|b| (b.number(), b)).collect();
        chain
    }

    /// A linear L2 chain where block `i` has L1 origin `origins[i]`.
    pub(crate) fn with_origins(origins: &[BlockId]) -> Self {
        let blocks =
            origins.iter().enumerate().map(|(n, origin)| l2_block(n as u64, *origin)).collect();
        Self::new(blocks)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }
}

#[async_trait]
impl L2Chain for MockL2Chain {
    async fn ref_by_number(&self, number: Option<u64>) -> Result<L2BlockRef, ChainError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing {
            return Err(mock_failure());
        }
        let block = match number {
            Some(number) => inner.blocks.get(&number),
            None => inner.blocks.values().next_back(),
        };
        block.copied().ok_or_else(|| ChainError::NotFound(format!("{number:?}")))
    }
}

#[derive(Debug, Default)]
struct PipelineInner {
    step_calls: Vec<Vec<BlockId>>,
    new_block_calls: Vec<BlockId>,
    failing: bool,
}

/// A pipeline that derives one block per step, with the first window block as L1 origin.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockPipeline {
    inner: Arc<Mutex<PipelineInner>>,
}

impl MockPipeline {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }

    /// The windows passed to every `step` call.
    pub(crate) fn step_calls(&self) -> Vec<Vec<BlockId>> {
        self.inner.lock().unwrap().step_calls.clone()
    }

    /// The L1 origins passed to every `new_block` call.
    pub(crate) fn new_block_calls(&self) -> Vec<BlockId> {
        self.inner.lock().unwrap().new_block_calls.clone()
    }
}

#[async_trait]
impl OutputPipeline for MockPipeline {
    async fn step(
        &self,
        safe_head: L2BlockRef,
        _finalized: BlockId,
        _unsafe_head: BlockId,
        window: &[BlockId],
    ) -> Result<L2BlockRef, PipelineError> {
        let mut inner = self.inner.lock().unwrap();
        inner.step_calls.push(window.to_vec());
        if inner.failing {
            return Err(PipelineError::Derivation("mock failure".to_owned()));
        }

        let number = safe_head.number() + 1;
        let origin = window.first().copied().unwrap_or_default();
        Ok(L2BlockRef::new(l2_id(number), safe_head.timestamp + BLOCK_TIME, origin))
    }

    async fn new_block(
        &self,
        _finalized: BlockId,
        unsafe_head: L2BlockRef,
        _safe_head: BlockId,
        l1_origin: BlockId,
    ) -> Result<(L2BlockRef, BatchData), PipelineError> {
        let mut inner = self.inner.lock().unwrap();
        inner.new_block_calls.push(l1_origin);
        if inner.failing {
            return Err(PipelineError::BlockBuilding("mock failure".to_owned()));
        }

        let number = unsafe_head.number() + 1;
        let block = L2BlockRef::new(l2_id(number), unsafe_head.timestamp + BLOCK_TIME, l1_origin);
        let batch = BatchData {
            parent_hash: unsafe_head.id.hash,
            epoch: l1_origin.number,
            timestamp: block.timestamp,
            transactions: Vec::new(),
        };
        Ok((block, batch))
    }
}

/// A submitter forwarding every accepted batch to a channel.
#[derive(Debug, Clone)]
pub(crate) struct MockSubmitter {
    submitted: mpsc::UnboundedSender<BatchData>,
    failing: Arc<Mutex<bool>>,
}

impl MockSubmitter {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<BatchData>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { submitted: tx, failing: Arc::default() }, rx)
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait]
impl BatchSubmitter for MockSubmitter {
    async fn submit(
        &self,
        _config: &RollupConfig,
        batches: Vec<BatchData>,
    ) -> Result<B256, SubmissionError> {
        if *self.failing.lock().unwrap() {
            return Err(SubmissionError::Rejected("mock failure".to_owned()));
        }
        let mut tx_hash = B256::ZERO;
        for batch in batches {
            tx_hash = batch.parent_hash;
            let _ = self.submitted.send(batch);
        }
        Ok(tx_hash)
    }
}
