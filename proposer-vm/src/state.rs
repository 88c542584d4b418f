//! Persisted proposer-layer state.
//!
//! The layer stores accepted envelopes and a handful of pointers in a
//! keyed binary store, written through atomic batches:
//!
//! ```text
//! forkHeight            -> u64 (absent until pinned)
//! blk/<wrapper-id>      -> envelope bytes
//! inner2wrap/<inner-id> -> wrapper id of the accepted wrapper
//! height/<u64>          -> wrapper id last accepted at that height
//! lastAccepted          -> wrapper id
//! ```
//!
//! All state changes of a single accept are grouped into one batch and
//! committed before the accept reports success.

use {
    crate::error::{ProposerVmError, Result},
    solana_hash::Hash,
    std::sync::Arc,
};

const FORK_HEIGHT_KEY: &[u8] = b"forkHeight";
const LAST_ACCEPTED_KEY: &[u8] = b"lastAccepted";
const BLOCK_PREFIX: &[u8] = b"blk/";
const INNER_INDEX_PREFIX: &[u8] = b"inner2wrap/";
const HEIGHT_PREFIX: &[u8] = b"height/";

/// One operation in a write batch.
#[derive(Debug, Clone)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// An ordered group of writes applied atomically.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(BatchOp::Put { key, value });
    }

    pub fn delete(&mut self, key: Vec<u8>) {
        self.ops.push(BatchOp::Delete { key });
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Key-value store with atomic batch writes. The concrete engine lives
/// outside this layer.
pub trait Database: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    /// Apply every op in `batch` atomically, or none of them.
    fn write(&self, batch: WriteBatch) -> Result<()>;
}

/// Typed accessors over the keyed layout.
#[derive(Clone)]
pub struct State {
    db: Arc<dyn Database>,
}

impl State {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// The pinned fork height, if any.
    pub fn fork_height(&self) -> Result<Option<u64>> {
        self.db.get(FORK_HEIGHT_KEY)?.map(decode_u64).transpose()
    }

    /// Envelope bytes of an accepted wrapper.
    pub fn wrapper_bytes(&self, id: &Hash) -> Result<Option<Vec<u8>>> {
        self.db.get(&block_key(id))
    }

    /// The accepted wrapper around the given inner block, if any.
    pub fn accepted_wrapper_for(&self, inner_id: &Hash) -> Result<Option<Hash>> {
        self.db
            .get(&inner_index_key(inner_id))?
            .map(decode_hash)
            .transpose()
    }

    /// The wrapper last accepted at `height`.
    pub fn accepted_at_height(&self, height: u64) -> Result<Option<Hash>> {
        self.db.get(&height_key(height))?.map(decode_hash).transpose()
    }

    /// The most recently accepted wrapper.
    pub fn last_accepted(&self) -> Result<Option<Hash>> {
        self.db.get(LAST_ACCEPTED_KEY)?.map(decode_hash).transpose()
    }

    /// Persist one accept atomically: the envelope bytes, the inner-to-
    /// wrapper index, the height index, the last-accepted pointer, and the
    /// fork height on the pinning accept.
    pub fn commit_accept(
        &self,
        wrapper_id: &Hash,
        envelope_bytes: &[u8],
        inner_id: &Hash,
        height: u64,
        pin_fork_height: Option<u64>,
    ) -> Result<()> {
        let mut batch = WriteBatch::default();
        batch.put(block_key(wrapper_id), envelope_bytes.to_vec());
        batch.put(inner_index_key(inner_id), wrapper_id.as_ref().to_vec());
        batch.put(height_key(height), wrapper_id.as_ref().to_vec());
        batch.put(LAST_ACCEPTED_KEY.to_vec(), wrapper_id.as_ref().to_vec());
        if let Some(fork_height) = pin_fork_height {
            batch.put(FORK_HEIGHT_KEY.to_vec(), fork_height.to_le_bytes().to_vec());
        }
        self.db.write(batch)
    }
}

fn block_key(id: &Hash) -> Vec<u8> {
    [BLOCK_PREFIX, id.as_ref()].concat()
}

fn inner_index_key(inner_id: &Hash) -> Vec<u8> {
    [INNER_INDEX_PREFIX, inner_id.as_ref()].concat()
}

fn height_key(height: u64) -> Vec<u8> {
    [HEIGHT_PREFIX, height.to_le_bytes().as_slice()].concat()
}

fn decode_u64(raw: Vec<u8>) -> Result<u64> {
    let arr: [u8; 8] = raw
        .as_slice()
        .try_into()
        .map_err(|_| ProposerVmError::Database(format!("u64 value of {} bytes", raw.len())))?;
    Ok(u64::from_le_bytes(arr))
}

fn decode_hash(raw: Vec<u8>) -> Result<Hash> {
    let arr: [u8; 32] = raw
        .as_slice()
        .try_into()
        .map_err(|_| ProposerVmError::Database(format!("hash value of {} bytes", raw.len())))?;
    Ok(Hash::new_from_array(arr))
}

#[cfg(any(test, feature = "dev-context-only-utils"))]
pub use mem_db::MemDb;

#[cfg(any(test, feature = "dev-context-only-utils"))]
mod mem_db {
    use {super::*, parking_lot::RwLock, std::collections::HashMap};

    /// In-memory store for tests. Batches apply under one lock, so they
    /// are atomic with respect to readers.
    #[derive(Default)]
    pub struct MemDb {
        map: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
        fail_writes: RwLock<bool>,
    }

    impl MemDb {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent `write` fail, for commit-failure tests.
        pub fn fail_writes(&self, fail: bool) {
            *self.fail_writes.write() = fail;
        }
    }

    impl Database for MemDb {
        fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
            Ok(self.map.read().get(key).cloned())
        }

        fn write(&self, batch: WriteBatch) -> Result<()> {
            if *self.fail_writes.read() {
                return Err(ProposerVmError::Database("write failure injected".to_string()));
            }
            let mut map = self.map.write();
            for op in batch.ops() {
                match op {
                    BatchOp::Put { key, value } => {
                        map.insert(key.clone(), value.clone());
                    }
                    BatchOp::Delete { key } => {
                        map.remove(key);
                    }
                }
            }
            Ok(())
        }
    }
}
