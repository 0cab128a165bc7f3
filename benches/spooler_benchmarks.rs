//! Criterion benchmarks for rust_log_spooler

use chrono::Local;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rust_log_spooler::core::SuppressionCache;
use rust_log_spooler::prelude::*;
use rust_log_spooler::format_template;
use std::time::Duration;

fn manual_spooler(dir: &tempfile::TempDir) -> LogSpooler {
    LogSpooler::builder()
        .log_dir(dir.path())
        .manual_drain()
        .build()
        .expect("Failed to build spooler")
}

// ============================================================================
// Enqueue Benchmarks
// ============================================================================

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");
    group.throughput(Throughput::Elements(1));

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let spooler = manual_spooler(&dir);

    group.bench_function("preformatted", |b| {
        b.iter(|| spooler.log(LogKind::Normal, black_box("Benchmark message")));
    });

    group.bench_function("template", |b| {
        b.iter(|| spooler.write_normal(black_box("request {0} took {1}ms"), &[&42, &3.5]));
    });

    group.bench_function("macro", |b| {
        b.iter(|| rust_log_spooler::normal!(spooler, "request {} took {}ms", black_box(42), 3.5));
    });

    group.finish();
}

// ============================================================================
// Concurrent Enqueue Benchmarks
// ============================================================================

fn bench_concurrent_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_enqueue");

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let spooler = manual_spooler(&dir);

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let handle = spooler.handle();
                    std::thread::spawn(move || {
                        handle.log(LogKind::Normal, black_box("Concurrent message"));
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Drain Cycle Benchmarks
// ============================================================================

fn bench_drain_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_cycle");
    group.measurement_time(Duration::from_secs(10));

    for batch in [1u64, 100, 1000] {
        group.throughput(Throughput::Elements(batch));
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let spooler = manual_spooler(&dir);

        group.bench_function(format!("batch_{}", batch), |b| {
            b.iter_batched(
                || {
                    for i in 0..batch {
                        spooler.write_normal("batched record {0}", &[&i]);
                    }
                },
                |_| spooler.drain_cycle().unwrap(),
                BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

// ============================================================================
// Filtering / Suppression Benchmarks
// ============================================================================

fn bench_suppression(c: &mut Criterion) {
    let mut group = c.benchmark_group("suppression");
    group.throughput(Throughput::Elements(1));

    let mut cache = SuppressionCache::default();
    let body = "connection reset by peer:\ncaused by: os error 104";
    let now = Local::now();

    group.bench_function("repeat_hit", |b| {
        b.iter(|| black_box(cache.check(black_box(body), now)));
    });

    group.bench_function("hash_only", |b| {
        b.iter(|| SuppressionCache::key(black_box(body)));
    });

    group.finish();
}

fn bench_template(c: &mut Criterion) {
    let mut group = c.benchmark_group("template");

    group.bench_function("positional", |b| {
        b.iter(|| format_template(black_box("{0} moved {1} to {2}"), &[&"job", &12, &"archive"]));
    });

    group.bench_function("no_args", |b| {
        b.iter(|| format_template(black_box("static message {not a placeholder}"), &[]));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_enqueue,
    bench_concurrent_enqueue,
    bench_drain_cycle,
    bench_suppression,
    bench_template
);

criterion_main!(benches);
