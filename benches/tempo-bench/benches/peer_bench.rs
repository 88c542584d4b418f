//! Peer-selection benchmarks.
//!
//! Measures:
//! - `get_any_peer` under full bandwidth heaps at peer counts 50, 500
//! - Bandwidth observation throughput

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use solana_pubkey::Pubkey;
use std::time::Instant;
use tempo_net::{NetConfig, PeerTracker, Version};

fn seeded_tracker(peers: usize) -> (PeerTracker, Vec<Pubkey>) {
    let config = NetConfig {
        desired_min_responsive_peers: 0,
        ..NetConfig::default()
    };
    let tracker = PeerTracker::with_seed(config, Instant::now(), 7);
    let now = Instant::now();
    let ids: Vec<Pubkey> = (0..peers).map(|_| Pubkey::new_unique()).collect();
    for (i, id) in ids.iter().enumerate() {
        tracker.connected(*id, Version::new(1, 0, 0));
        tracker.track_peer(*id);
        tracker.track_bandwidth(*id, (i + 1) as f64, now);
    }
    (tracker, ids)
}

fn bench_get_any_peer(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_any_peer");
    for n in [50usize, 500] {
        let (tracker, ids) = seeded_tracker(n);
        let now = Instant::now();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let picked = tracker.get_any_peer(None);
                // Re-observe so the popped peer re-enters the heap.
                if let Some(peer) = picked {
                    tracker.track_bandwidth(peer, 10.0, now);
                }
                picked
            });
        });
        let _ = ids;
    }
    group.finish();
}

fn bench_track_bandwidth(c: &mut Criterion) {
    let (tracker, ids) = seeded_tracker(200);
    let now = Instant::now();
    c.bench_function("track_bandwidth", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % ids.len();
            tracker.track_bandwidth(ids[i], i as f64, now);
        });
    });
}

criterion_group!(benches, bench_get_any_peer, bench_track_bandwidth);
criterion_main!(benches);
