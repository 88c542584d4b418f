//! Proposer-window scheduling benchmarks.
//!
//! Measures:
//! - Full ordering derivation at validator set sizes 50, 200, 1000
//! - Single-node delay queries
//! - Envelope build/parse round-trips

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use solana_hash::Hash;
use tempo_bench::helpers::{equal_weight_state, weighted_state};
use tempo_proposer_vm::{Envelope, Windower, MAX_BUILD_WINDOWS, MAX_VERIFY_WINDOWS};

fn bench_proposers(c: &mut Criterion) {
    let mut group = c.benchmark_group("windower_proposers");
    for n in [50usize, 200, 1000] {
        let (state, _pubkeys) = equal_weight_state(n);
        let windower = Windower::new(&Hash::new_unique(), Hash::default());
        group.throughput(Throughput::Elements(MAX_VERIFY_WINDOWS));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut height = 0u64;
            b.iter(|| {
                height += 1;
                windower
                    .proposers(&state, height, 100, MAX_VERIFY_WINDOWS)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("windower_delay");
    for n in [50usize, 200] {
        let (state, pubkeys) = weighted_state(n);
        let windower = Windower::new(&Hash::new_unique(), Hash::default());
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            let mut height = 0u64;
            b.iter(|| {
                height += 1;
                windower
                    .delay(&state, height, 100, &pubkeys[n / 2], MAX_BUILD_WINDOWS)
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_envelope_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope_roundtrip");
    for inner_size in [256usize, 4096, 65536] {
        let inner = vec![0xABu8; inner_size];
        group.throughput(Throughput::Bytes(inner_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(inner_size),
            &inner,
            |b, inner| {
                b.iter(|| {
                    let env =
                        Envelope::build_unsigned(Hash::default(), 1_000, 50, inner.clone());
                    Envelope::parse(env.bytes()).unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_proposers,
    bench_delay,
    bench_envelope_roundtrip
);
criterion_main!(benches);
