//! Tracks which validator identities each remote peer has been told about.
//!
//! Gossiping the full validator registry to every peer on every push is
//! wasteful; this tracker remembers, per peer, the set of identities
//! already delivered, so each push carries only a bounded delta of
//! identities the peer has not seen. A removed validator is forgotten
//! everywhere; re-registering under a new transaction id starts from a
//! clean slate with every peer.
//!
//! The tracker owns its mutex; all operations are O(1) set work except
//! the delta scan, which is bounded by the registry size.

use {
    crate::{
        error::{NetError, Result},
        message::ValidatorId,
    },
    log::debug,
    parking_lot::Mutex,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    std::collections::{HashMap, HashSet},
};

struct TrackerInner {
    /// Registered validators in registration order; the scan order of
    /// [`GossipTracker::get_unknown`].
    validators: Vec<ValidatorId>,
    /// Registry indexes.
    by_tx: HashMap<Hash, usize>,
    by_node: HashMap<Pubkey, usize>,
    /// Per tracked peer: the tx ids of validators the peer knows about.
    peers: HashMap<Pubkey, HashSet<Hash>>,
}

/// Per-peer bookkeeping of delivered validator identities.
pub struct GossipTracker {
    inner: Mutex<TrackerInner>,
}

impl Default for GossipTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GossipTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackerInner {
                validators: Vec::new(),
                by_tx: HashMap::new(),
                by_node: HashMap::new(),
                peers: HashMap::new(),
            }),
        }
    }

    /// Whether `peer` is currently tracked.
    pub fn tracked(&self, peer: &Pubkey) -> bool {
        self.inner.lock().peers.contains_key(peer)
    }

    /// Start tracking `peer`. Returns false if already tracked.
    pub fn start_tracking(&self, peer: Pubkey) -> bool {
        let mut inner = self.inner.lock();
        if inner.peers.contains_key(&peer) {
            return false;
        }
        inner.peers.insert(peer, HashSet::new());
        true
    }

    /// Stop tracking `peer`, dropping its delivery record. Returns false
    /// if it was not tracked.
    pub fn stop_tracking(&self, peer: &Pubkey) -> bool {
        self.inner.lock().peers.remove(peer).is_some()
    }

    /// Register a validator identity. Returns false if the node id or the
    /// tx id is already registered.
    pub fn add_validator(&self, validator: ValidatorId) -> bool {
        let mut inner = self.inner.lock();
        if inner.by_node.contains_key(&validator.node_id)
            || inner.by_tx.contains_key(&validator.tx_id)
        {
            return false;
        }
        let index = inner.validators.len();
        inner.validators.push(validator);
        inner.by_tx.insert(validator.tx_id, index);
        inner.by_node.insert(validator.node_id, index);
        true
    }

    /// The tx id registered for `node_id`, if any.
    pub fn get_validator(&self, node_id: &Pubkey) -> Option<Hash> {
        let inner = self.inner.lock();
        inner
            .by_node
            .get(node_id)
            .map(|&index| inner.validators[index].tx_id)
    }

    /// Unregister the validator with `node_id` and clear it from every
    /// peer's delivery record. Returns false if unknown.
    pub fn remove_validator(&self, node_id: &Pubkey) -> bool {
        let mut inner = self.inner.lock();
        let Some(index) = inner.by_node.remove(node_id) else {
            return false;
        };
        let removed = inner.validators.swap_remove(index);
        inner.by_tx.remove(&removed.tx_id);
        // The swap moved the former tail into `index`; fix its indexes.
        if index < inner.validators.len() {
            let moved = inner.validators[index];
            inner.by_tx.insert(moved.tx_id, index);
            inner.by_node.insert(moved.node_id, index);
        }
        for known in inner.peers.values_mut() {
            known.remove(&removed.tx_id);
        }
        debug!("removed validator {node_id} (tx {})", removed.tx_id);
        true
    }

    /// Mark `peer` as informed of the validators whose tx ids appear in
    /// `tx_ids`. Unknown tx ids are ignored. Fails if the peer is not
    /// tracked.
    pub fn add_known(&self, peer: &Pubkey, tx_ids: &[Hash]) -> Result<()> {
        let mut inner = self.inner.lock();
        let TrackerInner { by_tx, peers, .. } = &mut *inner;
        let known = peers
            .get_mut(peer)
            .ok_or(NetError::PeerNotTracked(*peer))?;
        for tx_id in tx_ids {
            if by_tx.contains_key(tx_id) {
                known.insert(*tx_id);
            }
        }
        Ok(())
    }

    /// Up to `limit` registered validators the peer has not been informed
    /// of, in registration order. Fails on an untracked peer or a zero
    /// limit.
    pub fn get_unknown(&self, peer: &Pubkey, limit: usize) -> Result<Vec<ValidatorId>> {
        if limit == 0 {
            return Err(NetError::InvalidLimit(limit));
        }
        let inner = self.inner.lock();
        let known = inner
            .peers
            .get(peer)
            .ok_or(NetError::PeerNotTracked(*peer))?;
        Ok(inner
            .validators
            .iter()
            .filter(|validator| !known.contains(&validator.tx_id))
            .take(limit)
            .copied()
            .collect())
    }
}
