//! Performance benchmarks for the subscription registry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use subscription_registry::{Callback, SubscriptionManager};

type Registry = SubscriptionManager<u32, Callback<u64>>;

fn sink() -> Arc<Callback<u64>> {
    let total = Arc::new(AtomicU64::new(0));
    Arc::new(move |value: &u64| {
        total.fetch_add(*value, Ordering::Relaxed);
    })
}

/// Benchmark publish fan-out with varying subscriber counts
fn bench_publish_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_fan_out");

    for subscribers in [1, 10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, &count| {
                let registry = Registry::new();
                let handler = sink();
                let _subs: Vec<_> = (0..count)
                    .map(|_| registry.subscribe(7, Arc::clone(&handler)))
                    .collect();

                b.iter(|| registry.publish(black_box(&7u32), black_box(&1u64)));
            },
        );
    }

    group.finish();
}

/// Benchmark subscribe followed by release
fn bench_subscribe_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("subscribe_release");

    for existing in [0, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("existing_on_channel", existing),
            &existing,
            |b, &count| {
                let registry = Registry::new();
                let handler = sink();
                let _subs: Vec<_> = (0..count)
                    .map(|_| registry.subscribe(7, Arc::clone(&handler)))
                    .collect();

                b.iter(|| {
                    let mut sub = registry.subscribe(7, Arc::clone(&handler));
                    sub.free();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark lookup on a registry spread over many channels
fn bench_handlers_lookup(c: &mut Criterion) {
    let registry = Registry::new();
    let handler = sink();
    let _subs: Vec<_> = (0..10_000u32)
        .map(|i| registry.subscribe(i % 500, Arc::clone(&handler)))
        .collect();

    c.bench_function("handlers_lookup_500_channels", |b| {
        b.iter(|| registry.handlers(black_box(&42u32)).len())
    });
}

criterion_group!(
    benches,
    bench_publish_fan_out,
    bench_subscribe_release,
    bench_handlers_lookup
);
criterion_main!(benches);
