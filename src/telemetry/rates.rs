use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::snapshot::{CoreTicks, Snapshot};
use super::thermal;

/// Ticks shorter than this are skipped and the previous rates held over,
/// to avoid divide-by-near-zero noise.
pub const MIN_TICK_SECS: f64 = 0.1;

pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MetricKind {
    Cpu,
    Memory,
    DiskUsage,
    DiskGrowth,
    NetRx,
    NetTx,
    CpuTemperature,
}

impl MetricKind {
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::DiskUsage => "disk",
            MetricKind::DiskGrowth => "disk-growth",
            MetricKind::NetRx => "net-rx",
            MetricKind::NetTx => "net-tx",
            MetricKind::CpuTemperature => "cpu-temp",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Unit {
    Percent,
    BytesPerSec,
    Celsius,
}

/// A per-second value (or direct gauge) derived from the latest snapshot
/// pair. Valid only for the interval it was computed from; consumed by
/// classification and rendering, never persisted.
#[derive(Clone, Debug, Serialize)]
pub struct Rate {
    pub kind: MetricKind,
    pub value: f64,
    pub unit: Unit,
}

/// Rate from a pair of cumulative counter reads. A counter that went
/// backwards (interface reset, wraparound) yields 0 for the tick, never a
/// negative or overflowed value.
pub fn counter_rate(prev: u64, curr: u64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 || curr < prev {
        return 0.0;
    }
    (curr - prev) as f64 / elapsed_secs
}

/// CPU percentage from tick deltas across all cores, clamped to [0, 100].
/// Returns `None` when the pair is unusable (missing cores, zero delta);
/// the caller holds the previous value in that case. A total counter that
/// went backwards is treated as a reset and reads as 0% for the tick.
pub fn cpu_percent(prev: &[CoreTicks], curr: &[CoreTicks]) -> Option<f64> {
    if prev.is_empty() || curr.is_empty() {
        return None;
    }
    let prev_busy: u64 = prev.iter().map(|c| c.busy).sum();
    let prev_total: u64 = prev.iter().map(|c| c.total).sum();
    let curr_busy: u64 = curr.iter().map(|c| c.busy).sum();
    let curr_total: u64 = curr.iter().map(|c| c.total).sum();

    if curr_total < prev_total || curr_busy < prev_busy {
        return Some(0.0);
    }
    let total_delta = curr_total - prev_total;
    if total_delta == 0 {
        return None;
    }
    let busy_delta = curr_busy - prev_busy;
    Some((busy_delta as f64 / total_delta as f64 * 100.0).clamp(0.0, 100.0))
}

fn interface_map(snap: &Snapshot) -> HashMap<&str, (u64, u64)> {
    snap.interfaces
        .iter()
        .map(|i| (i.name.as_str(), (i.rx_bytes, i.tx_bytes)))
        .collect()
}

/// Pure pairwise computation, exposed separately from the stateful
/// estimator so the arithmetic is testable with constructed snapshots.
/// `elapsed_secs` must be positive.
pub fn compute_rates(prev: &Snapshot, curr: &Snapshot, elapsed_secs: f64) -> Vec<Rate> {
    let mut out = Vec::new();

    if let Some(cpu) = cpu_percent(&prev.cores, &curr.cores) {
        out.push(Rate {
            kind: MetricKind::Cpu,
            value: cpu,
            unit: Unit::Percent,
        });
    }

    // Level metrics come straight off the latest snapshot.
    out.push(Rate {
        kind: MetricKind::Memory,
        value: curr.memory.used_percent(),
        unit: Unit::Percent,
    });
    out.push(Rate {
        kind: MetricKind::DiskUsage,
        value: curr.max_volume_used_percent(),
        unit: Unit::Percent,
    });

    out.push(Rate {
        kind: MetricKind::DiskGrowth,
        value: counter_rate(prev.volumes_used_bytes(), curr.volumes_used_bytes(), elapsed_secs),
        unit: Unit::BytesPerSec,
    });

    // Interfaces are matched by name; one that appeared mid-interval
    // contributes nothing this tick, one that reset reads as 0.
    let prev_ifaces = interface_map(prev);
    let mut rx = 0.0;
    let mut tx = 0.0;
    for iface in &curr.interfaces {
        if let Some(&(prev_rx, prev_tx)) = prev_ifaces.get(iface.name.as_str()) {
            rx += counter_rate(prev_rx, iface.rx_bytes, elapsed_secs);
            tx += counter_rate(prev_tx, iface.tx_bytes, elapsed_secs);
        }
    }
    out.push(Rate {
        kind: MetricKind::NetRx,
        value: rx,
        unit: Unit::BytesPerSec,
    });
    out.push(Rate {
        kind: MetricKind::NetTx,
        value: tx,
        unit: Unit::BytesPerSec,
    });

    out
}

/// Stateful estimator owned by the sampling loop. Holds the previous
/// snapshot explicitly (no ambient shared state), smooths delta-derived
/// rates over a small fixed window, and holds the last output over ticks
/// that are too short or degraded.
pub struct RateEstimator {
    prev: Option<Snapshot>,
    windows: HashMap<MetricKind, VecDeque<f64>>,
    window: usize,
    last: Vec<Rate>,
}

impl RateEstimator {
    pub fn new(window: usize) -> Self {
        Self {
            prev: None,
            windows: HashMap::new(),
            window: window.max(1),
            last: Vec::new(),
        }
    }

    /// Rates from the most recent completed tick, for hold-over delivery
    /// when a tick fails or is skipped.
    pub fn last_rates(&self) -> Vec<Rate> {
        self.last.clone()
    }

    pub fn update(&mut self, curr: Snapshot) -> Vec<Rate> {
        let Some(prev) = self.prev.take() else {
            // First tick: levels only, no deltas to compute yet.
            self.prev = Some(curr);
            return self.last.clone();
        };

        let elapsed = curr.taken_at.duration_since(prev.taken_at).as_secs_f64();
        if elapsed < MIN_TICK_SECS {
            // Too short: skip the tick, keep the older snapshot so the next
            // delta spans a sane interval.
            self.prev = Some(prev);
            return self.last.clone();
        }

        let mut rates = compute_rates(&prev, &curr, elapsed);
        for rate in &mut rates {
            if rate.unit == Unit::BytesPerSec || rate.kind == MetricKind::Cpu {
                rate.value = self.smooth(rate.kind, rate.value);
            }
        }

        let cpu = rates
            .iter()
            .find(|r| r.kind == MetricKind::Cpu)
            .map(|r| r.value);
        if let Some(cpu) = cpu {
            rates.push(Rate {
                kind: MetricKind::CpuTemperature,
                value: thermal::estimate_cpu_temperature(cpu),
                unit: Unit::Celsius,
            });
        }

        self.prev = Some(curr);
        self.last = rates.clone();
        rates
    }

    fn smooth(&mut self, kind: MetricKind, raw: f64) -> f64 {
        let window = self.windows.entry(kind).or_default();
        window.push_back(raw);
        while window.len() > self.window {
            window.pop_front();
        }
        window.iter().sum::<f64>() / window.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::telemetry::snapshot::{InterfaceCounters, MemoryStats, VolumeUsage};

    fn snap(at: Instant, rx: u64) -> Snapshot {
        Snapshot {
            taken_at: at,
            cores: vec![CoreTicks {
                busy: 100,
                total: 400,
            }],
            memory: MemoryStats {
                total: 1000,
                used: 500,
                active: 500,
                wired: 0,
                compressed: 0,
                free: 500,
            },
            volumes: vec![VolumeUsage {
                mount_point: "/".into(),
                total_bytes: 1000,
                available_bytes: 400,
            }],
            interfaces: vec![InterfaceCounters {
                name: "en0".into(),
                rx_bytes: rx,
                tx_bytes: 0,
            }],
        }
    }

    #[test]
    fn counter_rate_basic() {
        assert_eq!(counter_rate(1000, 1500, 1.0), 500.0);
        assert_eq!(counter_rate(1000, 1500, 2.0), 250.0);
    }

    #[test]
    fn counter_reset_reads_zero() {
        assert_eq!(counter_rate(1000, 200, 1.0), 0.0);
    }

    #[test]
    fn cpu_percent_from_tick_deltas() {
        let prev = [CoreTicks {
            busy: 100,
            total: 400,
        }];
        let curr = [CoreTicks {
            busy: 150,
            total: 500,
        }];
        assert_eq!(cpu_percent(&prev, &curr), Some(50.0));
    }

    #[test]
    fn cpu_percent_reset_reads_zero() {
        let prev = [CoreTicks {
            busy: 500,
            total: 900,
        }];
        let curr = [CoreTicks {
            busy: 10,
            total: 20,
        }];
        assert_eq!(cpu_percent(&prev, &curr), Some(0.0));
    }

    #[test]
    fn cpu_percent_unusable_pairs() {
        assert_eq!(cpu_percent(&[], &[]), None);
        let same = [CoreTicks {
            busy: 100,
            total: 400,
        }];
        assert_eq!(cpu_percent(&same, &same), None);
    }

    #[test]
    fn net_rate_from_snapshot_pair() {
        let t0 = Instant::now();
        let prev = snap(t0, 1000);
        let curr = snap(t0 + Duration::from_secs(1), 1500);
        let rates = compute_rates(&prev, &curr, 1.0);
        let rx = rates.iter().find(|r| r.kind == MetricKind::NetRx).unwrap();
        assert_eq!(rx.value, 500.0);
    }

    #[test]
    fn estimator_holds_over_short_ticks() {
        let t0 = Instant::now();
        let mut est = RateEstimator::new(1);
        assert!(est.update(snap(t0, 0)).is_empty());
        let first = est.update(snap(t0 + Duration::from_secs(1), 1000));
        assert!(!first.is_empty());

        // 10ms later: below the minimum interval, output held over.
        let held = est.update(snap(t0 + Duration::from_millis(1010), 9_999_999));
        let rx_first = first.iter().find(|r| r.kind == MetricKind::NetRx).unwrap();
        let rx_held = held.iter().find(|r| r.kind == MetricKind::NetRx).unwrap();
        assert_eq!(rx_first.value, rx_held.value);
    }

    #[test]
    fn smoothing_averages_over_window() {
        let mut est = RateEstimator::new(3);
        assert_eq!(est.smooth(MetricKind::NetRx, 300.0), 300.0);
        assert_eq!(est.smooth(MetricKind::NetRx, 0.0), 150.0);
        assert_eq!(est.smooth(MetricKind::NetRx, 0.0), 100.0);
        // Window full: the oldest sample falls out.
        assert_eq!(est.smooth(MetricKind::NetRx, 0.0), 0.0);
    }

    #[test]
    fn temperature_is_attached_once_cpu_is_known() {
        let t0 = Instant::now();
        let mut est = RateEstimator::new(1);
        est.update(snap(t0, 0));
        let mut curr = snap(t0 + Duration::from_secs(1), 0);
        curr.cores = vec![CoreTicks {
            busy: 200,
            total: 500,
        }];
        let rates = est.update(curr);
        assert!(
            rates
                .iter()
                .any(|r| r.kind == MetricKind::CpuTemperature && r.unit == Unit::Celsius)
        );
    }
}
