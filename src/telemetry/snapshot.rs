use std::path::PathBuf;
use std::time::Instant;

/// Cumulative tick counters for one CPU core. `total` includes `busy`.
/// These only ever grow, except when the kernel counter wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreTicks {
    pub busy: u64,
    pub total: u64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryStats {
    pub total: u64,
    pub used: u64,
    pub active: u64,
    pub wired: u64,
    pub compressed: u64,
    pub free: u64,
}

impl MemoryStats {
    /// Memory pressure is a level, not a rate: read straight off the latest
    /// snapshot, no delta involved.
    pub fn used_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f64 / self.total as f64 * 100.0
    }
}

#[derive(Clone, Debug)]
pub struct VolumeUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl VolumeUsage {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes() as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Cumulative byte counters for one network interface. Reset to zero when the
/// interface resets; the rate estimator treats `curr < prev` as a reset.
#[derive(Clone, Debug)]
pub struct InterfaceCounters {
    pub name: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// One consistent read of all raw OS counters at an instant.
///
/// Immutable once built; superseded snapshots are dropped by the sampling
/// loop (the bounded metric history keeps derived values, not snapshots).
/// An empty `cores` list means the per-core tick read failed this tick; the
/// rate estimator holds the previous CPU value in that case.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub taken_at: Instant,
    pub cores: Vec<CoreTicks>,
    pub memory: MemoryStats,
    pub volumes: Vec<VolumeUsage>,
    pub interfaces: Vec<InterfaceCounters>,
}

impl Snapshot {
    /// Sum of used bytes across mounted volumes, used as a cumulative-ish
    /// counter for the disk growth rate.
    pub fn volumes_used_bytes(&self) -> u64 {
        self.volumes.iter().map(|v| v.used_bytes()).sum()
    }

    /// Fullest volume, as the level that gets health-classified.
    pub fn max_volume_used_percent(&self) -> f64 {
        self.volumes
            .iter()
            .map(|v| v.used_percent())
            .fold(0.0, f64::max)
    }
}
