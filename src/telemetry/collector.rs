use sysinfo::{Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System};

use super::platform;
use super::snapshot::{InterfaceCounters, MemoryStats, Snapshot, VolumeUsage};

/// Counter source: thin adapter over the OS-provided cumulative counters.
/// Returns a full snapshot each call; keeps no derived state of its own
/// (the sysinfo handles it owns are refresh plumbing, not history).
pub struct Collector {
    sys: System,
    networks: Networks,
    disks: Disks,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().with_cpu(),
        );
        Collector {
            sys,
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
        }
    }

    pub fn system(&self) -> &System {
        &self.sys
    }

    /// Lowercased names of currently running processes, used by the cleanup
    /// side for in-use classification and app discovery.
    pub fn running_process_names(&mut self) -> std::collections::HashSet<String> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );
        self.sys
            .processes()
            .values()
            .map(|p| p.name().to_string_lossy().to_lowercase())
            .collect()
    }

    pub fn snapshot(&mut self) -> Snapshot {
        self.sys.refresh_memory();
        self.networks.refresh(true);
        self.disks.refresh(true);

        // A failed platform read degrades this tick (empty core list / zone
        // fallback) rather than failing the snapshot.
        let cores = platform::cpu_ticks().unwrap_or_default();
        let memory = self.build_memory();

        let volumes = self
            .disks
            .list()
            .iter()
            .map(|disk| VolumeUsage {
                mount_point: disk.mount_point().to_path_buf(),
                total_bytes: disk.total_space(),
                available_bytes: disk.available_space(),
            })
            .collect();

        let interfaces = self
            .networks
            .iter()
            .map(|(name, data)| InterfaceCounters {
                name: name.clone(),
                rx_bytes: data.total_received(),
                tx_bytes: data.total_transmitted(),
            })
            .collect();

        Snapshot {
            taken_at: std::time::Instant::now(),
            cores,
            memory,
            volumes,
            interfaces,
        }
    }

    fn build_memory(&self) -> MemoryStats {
        let total = self.sys.total_memory();
        let used = self.sys.used_memory();
        let free = self.sys.free_memory();

        match platform::memory_zones() {
            Some(zones) => MemoryStats {
                total,
                used,
                active: zones.active,
                wired: zones.wired,
                compressed: zones.compressed,
                free: zones.free,
            },
            None => MemoryStats {
                total,
                used,
                active: used,
                wired: 0,
                compressed: 0,
                free,
            },
        }
    }
}
