//! Membership query benchmarks.
//!
//! Measures the three per-sample lookups a traversal performs at a
//! categorical split node, for small and wide cardinalities.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use catset::{CategoryRegistry, FeatureKind, NodeSplit, Word};

const N_NODES: usize = 256;
const N_QUERIES: usize = 4096;

/// Simple LCG so the benchmark has no extra dependencies.
fn pseudo_random(n: usize, bound: u32, seed: u64) -> Vec<u32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 33) as u32) % bound
        })
        .collect()
}

fn build_registry(cardinality: u32) -> CategoryRegistry {
    let thresholds: Vec<u32> = (0..cardinality).map(|c| c * 2).collect();
    let mut registry =
        CategoryRegistry::from_features(&[FeatureKind::Categorical(&thresholds[..])]).unwrap();

    let n_words = cardinality.div_ceil(32) as usize;
    let masks: Vec<Vec<Word>> = (0..N_NODES)
        .map(|node| pseudo_random(n_words, u32::MAX, node as u64 + 1))
        .collect();
    let splits: Vec<NodeSplit<'_, u32>> = masks
        .iter()
        .enumerate()
        .map(|(node, mask)| NodeSplit {
            node,
            category_bins: &thresholds,
            binned_mask: mask,
        })
        .collect();
    registry.insert_nodes(&splits).unwrap();
    registry
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    group.throughput(Throughput::Elements(N_QUERIES as u64));

    for cardinality in [16u32, 256, 4096] {
        let registry = build_registry(cardinality);
        let nodes: Vec<usize> = pseudo_random(N_QUERIES, N_NODES as u32, 7)
            .into_iter()
            .map(|n| n as usize)
            .collect();
        let values = pseudo_random(N_QUERIES, cardinality * 2, 11);

        group.bench_with_input(
            BenchmarkId::new("is_known_category", cardinality),
            &values,
            |b, values| {
                b.iter(|| {
                    values
                        .iter()
                        .filter(|&&v| registry.is_known_category(0, black_box(v)))
                        .count()
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("raw_category_in_bitset", cardinality),
            &values,
            |b, values| {
                b.iter(|| {
                    nodes
                        .iter()
                        .zip(values)
                        .filter(|&(&n, &v)| registry.raw_category_in_bitset(n, black_box(v)))
                        .count()
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("binned_category_in_bitset", cardinality),
            &values,
            |b, values| {
                b.iter(|| {
                    nodes
                        .iter()
                        .zip(values)
                        .filter(|&(&n, &v)| {
                            registry.binned_category_in_bitset(n, black_box(v / 2))
                        })
                        .count()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
