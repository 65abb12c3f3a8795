use super::{MemoryZones, PlatformCounters};
use crate::telemetry::snapshot::CoreTicks;

pub struct Platform;

impl PlatformCounters for Platform {
    fn cpu_ticks() -> Option<Vec<CoreTicks>> {
        let contents = std::fs::read_to_string("/proc/stat").ok()?;
        let mut cores = Vec::new();
        for line in contents.lines() {
            // Per-core lines are "cpuN ..."; skip the aggregate "cpu " line.
            let Some(rest) = line.strip_prefix("cpu") else {
                continue;
            };
            if !rest.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }
            let fields: Vec<u64> = rest
                .split_whitespace()
                .skip(1)
                .filter_map(|f| f.parse().ok())
                .collect();
            // user nice system idle iowait irq softirq steal
            if fields.len() < 4 {
                continue;
            }
            let user = fields[0];
            let nice = fields[1];
            let system = fields[2];
            let idle = fields[3];
            let iowait = fields.get(4).copied().unwrap_or(0);
            let irq = fields.get(5).copied().unwrap_or(0);
            let softirq = fields.get(6).copied().unwrap_or(0);
            let steal = fields.get(7).copied().unwrap_or(0);

            let busy = user + nice + system + irq + softirq + steal;
            let total = busy + idle + iowait;
            cores.push(CoreTicks { busy, total });
        }
        if cores.is_empty() { None } else { Some(cores) }
    }

    fn memory_zones() -> Option<MemoryZones> {
        let contents = std::fs::read_to_string("/proc/meminfo").ok()?;
        let mut active = None;
        let mut wired = None;
        let mut free = None;
        for line in contents.lines() {
            if let Some(val) = line.strip_prefix("Active:") {
                active = parse_kib(val);
            } else if let Some(val) = line.strip_prefix("Unevictable:") {
                wired = parse_kib(val);
            } else if let Some(val) = line.strip_prefix("MemFree:") {
                free = parse_kib(val);
            }
        }
        Some(MemoryZones {
            active: active?,
            wired: wired.unwrap_or(0),
            // No compressed-memory zone on Linux.
            compressed: 0,
            free: free?,
        })
    }
}

fn parse_kib(value: &str) -> Option<u64> {
    let number = value.trim().trim_end_matches("kB").trim();
    number.parse::<u64>().ok().map(|kib| kib * 1024)
}
