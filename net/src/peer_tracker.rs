//! Bandwidth-weighted peer selection.
//!
//! Tracks the response bandwidth observed from each connected peer and
//! picks targets for outbound requests: mostly the best-known peer by
//! decayed bandwidth, sometimes an arbitrary responsive peer, and (while
//! few peers have proven themselves, or with an exponentially vanishing
//! probability afterwards) a brand-new untracked peer.
//!
//! The tracker owns its mutex; all operations are short and never suspend
//! while holding it.

use {
    crate::{averager::Averager, config::NetConfig, message::Version},
    log::{debug, warn},
    parking_lot::Mutex,
    rand::{rngs::StdRng, Rng, SeedableRng},
    solana_pubkey::Pubkey,
    std::{
        collections::{BinaryHeap, HashMap, HashSet},
        time::Instant,
    },
};

/// Per-peer bookkeeping.
#[derive(Debug)]
struct PeerEntry {
    /// Version the peer advertised on connect.
    version: Version,
    /// Decayed response bandwidth; absent until the first observation.
    bandwidth: Option<Averager>,
}

/// Max-heap entry, keyed by the bandwidth snapshot taken at push time.
/// Entries are invalidated lazily: a pop only yields an entry whose
/// generation still matches the peer's latest push.
#[derive(Debug)]
struct HeapEntry {
    bandwidth: f64,
    generation: u64,
    peer: Pubkey,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.bandwidth
            .total_cmp(&other.bandwidth)
            .then_with(|| self.peer.cmp(&other.peer))
    }
}

#[derive(Debug, Default)]
struct BandwidthHeap {
    heap: BinaryHeap<HeapEntry>,
    generations: HashMap<Pubkey, u64>,
    counter: u64,
}

impl BandwidthHeap {
    /// Insert or refresh a peer's position with a new bandwidth snapshot.
    fn push(&mut self, peer: Pubkey, bandwidth: f64) {
        self.counter += 1;
        self.generations.insert(peer, self.counter);
        self.heap.push(HeapEntry {
            bandwidth,
            generation: self.counter,
            peer,
        });
    }

    /// Remove and return the best current peer, skipping stale entries.
    /// The peer only re-enters the heap on its next observation.
    fn pop(&mut self) -> Option<Pubkey> {
        while let Some(entry) = self.heap.pop() {
            if self.generations.get(&entry.peer) == Some(&entry.generation) {
                self.generations.remove(&entry.peer);
                return Some(entry.peer);
            }
        }
        None
    }

    /// Drop a peer without touching the heap storage; its entries become
    /// stale and are skipped on pop.
    fn remove(&mut self, peer: &Pubkey) {
        self.generations.remove(peer);
    }
}

struct TrackerInner {
    /// All peers we are connected to.
    peers: HashMap<Pubkey, PeerEntry>,
    /// Peers that have received at least one request since they connected.
    tracked: HashSet<Pubkey>,
    /// Peers whose most recent bandwidth sample was positive.
    responsive: HashSet<Pubkey>,
    /// Max-heap over decayed per-peer bandwidth.
    bandwidth_heap: BandwidthHeap,
    /// EWMA across all positive samples from all peers.
    average_bandwidth: Averager,
    rng: StdRng,
}

/// Tracks response bandwidth per peer and selects request targets.
pub struct PeerTracker {
    config: NetConfig,
    inner: Mutex<TrackerInner>,
}

impl PeerTracker {
    pub fn new(config: NetConfig, now: Instant) -> Self {
        Self::with_rng(config, now, StdRng::from_entropy())
    }

    /// Deterministic tracker for tests.
    #[cfg(any(test, feature = "dev-context-only-utils"))]
    pub fn with_seed(config: NetConfig, now: Instant, seed: u64) -> Self {
        Self::with_rng(config, now, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: NetConfig, now: Instant, rng: StdRng) -> Self {
        let halflife = config.bandwidth_halflife;
        Self {
            config,
            inner: Mutex::new(TrackerInner {
                peers: HashMap::new(),
                tracked: HashSet::new(),
                responsive: HashSet::new(),
                bandwidth_heap: BandwidthHeap::default(),
                average_bandwidth: Averager::new(0.0, halflife, now),
                rng,
            }),
        }
    }

    /// Number of connected peers.
    pub fn size(&self) -> usize {
        self.inner.lock().peers.len()
    }

    /// Number of peers whose latest sample was positive.
    pub fn responsive_count(&self) -> usize {
        self.inner.lock().responsive.len()
    }

    /// Whether the peer has been handed a request since connecting.
    pub fn is_tracked(&self, peer: &Pubkey) -> bool {
        self.inner.lock().tracked.contains(peer)
    }

    /// EWMA of positive bandwidth samples across all peers.
    pub fn average_bandwidth(&self, now: Instant) -> f64 {
        self.inner.lock().average_bandwidth.read(now)
    }

    /// Record that `peer` connected, advertising `version`. A duplicate
    /// connect refreshes the stored version and keeps the bandwidth
    /// history.
    pub fn connected(&self, peer: Pubkey, version: Version) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.peers.get_mut(&peer) {
            if entry.version != version {
                warn!(
                    "updating version of already connected peer {peer}: {} -> {version}",
                    entry.version
                );
                entry.version = version;
            } else {
                warn!("ignoring connect for already connected peer {peer} with identical version");
            }
            return;
        }
        inner.peers.insert(
            peer,
            PeerEntry {
                version,
                bandwidth: None,
            },
        );
    }

    /// Remove a disconnected peer from every structure.
    pub fn disconnected(&self, peer: &Pubkey) {
        let mut inner = self.inner.lock();
        inner.bandwidth_heap.remove(peer);
        inner.tracked.remove(peer);
        inner.responsive.remove(peer);
        inner.peers.remove(peer);
    }

    /// Record that a request was sent to `peer`.
    pub fn track_peer(&self, peer: Pubkey) {
        self.inner.lock().tracked.insert(peer);
    }

    /// Record an observed response bandwidth for `peer`. A positive sample
    /// marks the peer responsive and feeds the global average; a zero
    /// sample only demotes the peer from the responsive set.
    pub fn track_bandwidth(&self, peer: Pubkey, bandwidth: f64, now: Instant) {
        let mut inner = self.inner.lock();
        let Some(entry) = inner.peers.get_mut(&peer) else {
            debug!("bandwidth sample for unconnected peer {peer}");
            return;
        };
        let snapshot = match entry.bandwidth.as_mut() {
            Some(averager) => {
                averager.observe(bandwidth, now);
                averager.read(now)
            }
            None => {
                entry.bandwidth =
                    Some(Averager::new(bandwidth, self.config.bandwidth_halflife, now));
                bandwidth
            }
        };
        inner.bandwidth_heap.push(peer, snapshot);

        if bandwidth > 0.0 {
            inner.responsive.insert(peer);
            inner.average_bandwidth.observe(bandwidth, now);
        } else {
            inner.responsive.remove(&peer);
        }
    }

    /// Select a peer for an outbound request.
    ///
    /// 1. While few peers are responsive (or, afterwards, with probability
    ///    `exp(-responsive * new_peer_connect_factor)`), return any
    ///    untracked connected peer with version ≥ `min_version`.
    /// 2. Otherwise return an arbitrary responsive peer with probability
    ///    `random_peer_probability`, else the top of the bandwidth heap
    ///    (which re-enters only on its next observation).
    /// 3. Fall back to an arbitrary tracked peer.
    pub fn get_any_peer(&self, min_version: Option<Version>) -> Option<Pubkey> {
        let mut inner = self.inner.lock();

        if self.should_track_new_peer(&mut inner) {
            let candidate = inner.peers.iter().find(|(peer, entry)| {
                min_version.map_or(true, |min| entry.version >= min)
                    && !inner.tracked.contains(*peer)
            });
            if let Some((peer, _)) = candidate {
                let peer = *peer;
                debug!(
                    "exploring untracked peer {peer} ({} tracked)",
                    inner.tracked.len()
                );
                return Some(peer);
            }
        }

        let use_random = inner.rng.gen::<f64>() < self.config.random_peer_probability;
        let picked = if use_random {
            match inner.responsive.len() {
                0 => None,
                len => {
                    let index = inner.rng.gen_range(0..len);
                    inner.responsive.iter().nth(index).copied()
                }
            }
        } else {
            inner.bandwidth_heap.pop()
        };
        match picked {
            Some(peer) => {
                debug!("selected peer {peer} (random: {use_random})");
                Some(peer)
            }
            None => inner.tracked.iter().next().copied(),
        }
    }

    fn should_track_new_peer(&self, inner: &mut TrackerInner) -> bool {
        if inner.responsive.len() < self.config.desired_min_responsive_peers {
            return true;
        }
        if inner.tracked.len() >= inner.peers.len() {
            // already tracking every connected peer
            return false;
        }
        let probability =
            (-(inner.responsive.len() as f64) * self.config.new_peer_connect_factor).exp();
        inner.rng.gen::<f64>() < probability
    }
}
