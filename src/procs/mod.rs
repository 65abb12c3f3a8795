pub mod kill;

use serde::Serialize;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Clone, Debug, Serialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub command: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Cpu,
    Memory,
    Pid,
    Name,
}

impl SortKey {
    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => SortKey::Memory,
            "pid" => SortKey::Pid,
            "name" => SortKey::Name,
            _ => SortKey::Cpu,
        }
    }
}

pub fn refresh_processes(sys: &mut System) {
    sys.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing().with_memory().with_cpu(),
    );
}

pub fn collect_processes(sys: &System) -> Vec<ProcessEntry> {
    sys.processes()
        .iter()
        .map(|(pid, process)| ProcessEntry {
            pid: pid.as_u32(),
            name: process.name().to_string_lossy().to_string(),
            cpu_percent: process.cpu_usage(),
            memory_bytes: process.memory(),
            command: process
                .cmd()
                .iter()
                .map(|s| s.to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join(" "),
        })
        .collect()
}

pub fn sort_processes(entries: &mut [ProcessEntry], key: SortKey) {
    match key {
        SortKey::Cpu => entries.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        SortKey::Memory => entries.sort_by(|a, b| b.memory_bytes.cmp(&a.memory_bytes)),
        SortKey::Pid => entries.sort_by_key(|e| e.pid),
        SortKey::Name => entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pid: u32, name: &str, cpu: f32, mem: u64) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: name.to_string(),
            cpu_percent: cpu,
            memory_bytes: mem,
            command: String::new(),
        }
    }

    #[test]
    fn sorts_by_each_key() {
        let mut entries = vec![
            entry(3, "bravo", 1.0, 300),
            entry(1, "Alpha", 9.0, 100),
            entry(2, "charlie", 5.0, 200),
        ];

        sort_processes(&mut entries, SortKey::Cpu);
        assert_eq!(entries[0].pid, 1);

        sort_processes(&mut entries, SortKey::Memory);
        assert_eq!(entries[0].pid, 3);

        sort_processes(&mut entries, SortKey::Pid);
        assert_eq!(entries[0].pid, 1);

        sort_processes(&mut entries, SortKey::Name);
        assert_eq!(entries[0].name, "Alpha");
    }

    #[test]
    fn sort_key_parsing_defaults_to_cpu() {
        assert_eq!(SortKey::from_str_config("memory"), SortKey::Memory);
        assert_eq!(SortKey::from_str_config("bogus"), SortKey::Cpu);
    }

    #[test]
    fn live_listing_contains_this_process() {
        let mut sys = System::new();
        refresh_processes(&mut sys);
        let entries = collect_processes(&sys);
        let own = std::process::id();
        assert!(entries.iter().any(|e| e.pid == own));
    }
}
