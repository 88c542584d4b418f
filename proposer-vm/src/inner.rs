//! Interfaces to the wrapped chain and the validator-state oracle.
//!
//! The inner chain VM is opaque to the proposer layer: blocks are byte
//! strings with ids, heights, and timestamps, plus lifecycle callbacks. The
//! validator-state oracle answers height and validator-set queries against
//! a separate chain; the proposer ordering snapshots its answers at the
//! P-reference height each envelope declares.

use {
    crate::error::Result,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    std::{collections::HashMap, sync::Arc},
};

/// Decision state of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Known but not yet decided.
    Processing,
    /// Decided and part of the canonical chain.
    Accepted,
    /// Decided against.
    Rejected,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Processing => write!(f, "Processing"),
            Status::Accepted => write!(f, "Accepted"),
            Status::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A block of the wrapped chain.
///
/// Implementations use interior mutability for status transitions; the
/// proposer layer only drives them through `verify` / `accept` / `reject`.
pub trait InnerBlock: Send + Sync {
    fn id(&self) -> Hash;
    fn parent(&self) -> Hash;
    fn height(&self) -> u64;
    /// Unix seconds.
    fn timestamp(&self) -> i64;
    fn bytes(&self) -> &[u8];
    fn status(&self) -> Status;
    fn verify(&self) -> Result<()>;
    fn accept(&self) -> Result<()>;
    fn reject(&self) -> Result<()>;

    /// The two option children of an oracle block, in declared order.
    /// Non-oracle blocks return [`ProposerVmError::NotOracle`].
    fn options(&self) -> Result<[Arc<dyn InnerBlock>; 2]> {
        Err(crate::error::ProposerVmError::NotOracle)
    }
}

/// The wrapped chain VM.
pub trait InnerVm: Send + Sync {
    fn build_block(&self) -> Result<Arc<dyn InnerBlock>>;
    fn parse_block(&self, bytes: &[u8]) -> Result<Arc<dyn InnerBlock>>;
    fn get_block(&self, id: &Hash) -> Result<Arc<dyn InnerBlock>>;
    fn set_preference(&self, id: &Hash) -> Result<()>;
    fn last_accepted(&self) -> Result<Hash>;
}

/// The validator-state oracle.
pub trait ValidatorState: Send + Sync {
    /// Tip height of the validator-state chain.
    fn current_height(&self) -> Result<u64>;
    /// Lowest height whose validator set is still retrievable.
    fn minimum_height(&self) -> Result<u64>;
    /// Validator weights at `height` for `subnet_id`.
    fn validator_set(&self, height: u64, subnet_id: &Hash) -> Result<HashMap<Pubkey, u64>>;
}

#[cfg(any(test, feature = "dev-context-only-utils"))]
pub use test_utils::{TestInnerBlock, TestInnerVm, TestValidatorState};

#[cfg(any(test, feature = "dev-context-only-utils"))]
mod test_utils {
    use {
        super::*,
        crate::error::ProposerVmError,
        parking_lot::Mutex,
        std::sync::atomic::{AtomicU64, AtomicUsize, Ordering},
    };

    /// Scriptable inner block. Records how often `verify` runs so tests can
    /// assert the at-most-once contract.
    pub struct TestInnerBlock {
        id: Hash,
        parent: Hash,
        height: u64,
        timestamp: i64,
        bytes: Vec<u8>,
        status: Mutex<Status>,
        verify_calls: AtomicUsize,
        options: Mutex<Option<[Arc<dyn InnerBlock>; 2]>>,
    }

    impl TestInnerBlock {
        pub fn new(seed: u8, parent: Hash, height: u64, timestamp: i64) -> Arc<Self> {
            let bytes = vec![seed; 8];
            Arc::new(Self {
                id: solana_sha256_hasher::hash(&bytes),
                parent,
                height,
                timestamp,
                bytes,
                status: Mutex::new(Status::Processing),
                verify_calls: AtomicUsize::new(0),
                options: Mutex::new(None),
            })
        }

        /// Declare this block an oracle with the given option children.
        pub fn set_options(&self, opts: [Arc<dyn InnerBlock>; 2]) {
            *self.options.lock() = Some(opts);
        }

        pub fn verify_calls(&self) -> usize {
            self.verify_calls.load(Ordering::SeqCst)
        }
    }

    impl InnerBlock for TestInnerBlock {
        fn id(&self) -> Hash {
            self.id
        }

        fn parent(&self) -> Hash {
            self.parent
        }

        fn height(&self) -> u64 {
            self.height
        }

        fn timestamp(&self) -> i64 {
            self.timestamp
        }

        fn bytes(&self) -> &[u8] {
            &self.bytes
        }

        fn status(&self) -> Status {
            *self.status.lock()
        }

        fn verify(&self) -> Result<()> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn accept(&self) -> Result<()> {
            *self.status.lock() = Status::Accepted;
            Ok(())
        }

        fn reject(&self) -> Result<()> {
            *self.status.lock() = Status::Rejected;
            Ok(())
        }

        fn options(&self) -> Result<[Arc<dyn InnerBlock>; 2]> {
            self.options
                .lock()
                .clone()
                .ok_or(ProposerVmError::NotOracle)
        }
    }

    /// Scriptable inner VM: a registry of blocks plus a build queue.
    #[derive(Default)]
    pub struct TestInnerVm {
        blocks: Mutex<HashMap<Hash, Arc<dyn InnerBlock>>>,
        build_queue: Mutex<Vec<Arc<dyn InnerBlock>>>,
        preference: Mutex<Option<Hash>>,
        last_accepted: Mutex<Option<Hash>>,
    }

    impl TestInnerVm {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a block so `parse_block` / `get_block` can find it.
        pub fn register(&self, block: Arc<dyn InnerBlock>) {
            self.blocks.lock().insert(block.id(), block);
        }

        /// Queue the next block `build_block` returns (FIFO).
        pub fn enqueue_build(&self, block: Arc<dyn InnerBlock>) {
            self.register(Arc::clone(&block));
            self.build_queue.lock().push(block);
        }

        pub fn set_last_accepted(&self, id: Hash) {
            *self.last_accepted.lock() = Some(id);
        }

        pub fn preference(&self) -> Option<Hash> {
            *self.preference.lock()
        }
    }

    impl InnerVm for TestInnerVm {
        fn build_block(&self) -> Result<Arc<dyn InnerBlock>> {
            let mut queue = self.build_queue.lock();
            if queue.is_empty() {
                return Err(ProposerVmError::Inner("no block to build".to_string()));
            }
            Ok(queue.remove(0))
        }

        fn parse_block(&self, bytes: &[u8]) -> Result<Arc<dyn InnerBlock>> {
            self.blocks
                .lock()
                .values()
                .find(|b| b.bytes() == bytes)
                .cloned()
                .ok_or_else(|| ProposerVmError::Parse("unknown inner block bytes".to_string()))
        }

        fn get_block(&self, id: &Hash) -> Result<Arc<dyn InnerBlock>> {
            self.blocks
                .lock()
                .get(id)
                .cloned()
                .ok_or(ProposerVmError::NotFound(*id))
        }

        fn set_preference(&self, id: &Hash) -> Result<()> {
            *self.preference.lock() = Some(*id);
            Ok(())
        }

        fn last_accepted(&self) -> Result<Hash> {
            self.last_accepted
                .lock()
                .ok_or_else(|| ProposerVmError::Inner("no accepted block".to_string()))
        }
    }

    /// Scriptable validator-state oracle with per-height snapshots.
    #[derive(Default)]
    pub struct TestValidatorState {
        current: AtomicU64,
        minimum: AtomicU64,
        sets: Mutex<HashMap<u64, HashMap<Pubkey, u64>>>,
        default_set: Mutex<HashMap<Pubkey, u64>>,
    }

    impl TestValidatorState {
        pub fn new(current: u64) -> Self {
            let state = Self::default();
            state.current.store(current, Ordering::SeqCst);
            state
        }

        pub fn set_current_height(&self, height: u64) {
            self.current.store(height, Ordering::SeqCst);
        }

        pub fn set_minimum_height(&self, height: u64) {
            self.minimum.store(height, Ordering::SeqCst);
        }

        /// Snapshot the validator set returned for `height`.
        pub fn set_validators_at(&self, height: u64, validators: Vec<(Pubkey, u64)>) {
            self.sets
                .lock()
                .insert(height, validators.into_iter().collect());
        }

        /// Fallback set for heights without an explicit snapshot.
        pub fn set_default_validators(&self, validators: Vec<(Pubkey, u64)>) {
            *self.default_set.lock() = validators.into_iter().collect();
        }
    }

    impl ValidatorState for TestValidatorState {
        fn current_height(&self) -> Result<u64> {
            Ok(self.current.load(Ordering::SeqCst))
        }

        fn minimum_height(&self) -> Result<u64> {
            Ok(self.minimum.load(Ordering::SeqCst))
        }

        fn validator_set(&self, height: u64, _subnet_id: &Hash) -> Result<HashMap<Pubkey, u64>> {
            if let Some(set) = self.sets.lock().get(&height) {
                return Ok(set.clone());
            }
            Ok(self.default_set.lock().clone())
        }
    }
}
