use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use macsweep::cleanup::scanner;
use macsweep::telemetry::rates::{RateEstimator, compute_rates};
use macsweep::telemetry::snapshot::{CoreTicks, InterfaceCounters, MemoryStats, Snapshot, VolumeUsage};

fn make_snapshot(at: Instant, cores: usize, interfaces: usize, offset: u64) -> Snapshot {
    Snapshot {
        taken_at: at,
        cores: (0..cores)
            .map(|i| CoreTicks {
                busy: 1_000 * i as u64 + offset,
                total: 4_000 * i as u64 + offset * 4,
            })
            .collect(),
        memory: MemoryStats {
            total: 16 << 30,
            used: 8 << 30,
            active: 6 << 30,
            wired: 2 << 30,
            compressed: 1 << 30,
            free: 8 << 30,
        },
        volumes: vec![VolumeUsage {
            mount_point: "/".into(),
            total_bytes: 500 << 30,
            available_bytes: (200 << 30) - offset,
        }],
        interfaces: (0..interfaces)
            .map(|i| InterfaceCounters {
                name: format!("en{i}"),
                rx_bytes: 1_000_000 * i as u64 + offset,
                tx_bytes: 500_000 * i as u64 + offset,
            })
            .collect(),
    }
}

fn bench_compute_rates(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_rates_8_16_64_cores");
    let t0 = Instant::now();

    for cores in [8usize, 16, 64] {
        let prev = make_snapshot(t0, cores, 4, 0);
        let curr = make_snapshot(t0 + Duration::from_secs(2), cores, 4, 10_000);
        group.bench_with_input(
            BenchmarkId::from_parameter(cores),
            &(prev, curr),
            |b, (prev, curr)| {
                b.iter(|| {
                    let rates = compute_rates(black_box(prev), black_box(curr), 2.0);
                    black_box(rates);
                })
            },
        );
    }

    group.finish();
}

fn bench_estimator_tick(c: &mut Criterion) {
    let t0 = Instant::now();
    c.bench_function("estimator_tick_16_cores", |b| {
        b.iter(|| {
            let mut est = RateEstimator::new(3);
            for tick in 0..10u64 {
                let snap = make_snapshot(
                    t0 + Duration::from_secs(tick),
                    16,
                    4,
                    tick * 10_000,
                );
                black_box(est.update(snap));
            }
        })
    });
}

fn bench_dir_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("dir_size_100_500_files");

    for files in [100usize, 500] {
        let tmp = tempfile::tempdir().expect("bench tempdir");
        for i in 0..files {
            let sub = tmp.path().join(format!("bucket_{}", i % 10));
            std::fs::create_dir_all(&sub).expect("bench subdir");
            std::fs::write(sub.join(format!("f{i}.dat")), vec![0u8; 256]).expect("bench file");
        }
        group.bench_with_input(BenchmarkId::from_parameter(files), &tmp, |b, tmp| {
            b.iter(|| {
                let mut errors = Vec::new();
                let size = scanner::dir_size(black_box(tmp.path()), 4, &mut errors);
                black_box(size);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compute_rates, bench_estimator_tick, bench_dir_size);
criterion_main!(benches);
