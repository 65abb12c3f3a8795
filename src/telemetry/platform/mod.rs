use crate::telemetry::snapshot::CoreTicks;

/// Raw memory zone page counts in bytes, before the collector merges in
/// sysinfo's totals.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryZones {
    pub active: u64,
    pub wired: u64,
    pub compressed: u64,
    pub free: u64,
}

pub trait PlatformCounters {
    /// Cumulative (busy, total) ticks per core. `None` when the read fails;
    /// the caller degrades that tick instead of erroring.
    fn cpu_ticks() -> Option<Vec<CoreTicks>>;
    fn memory_zones() -> Option<MemoryZones>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod fallback {
    pub struct Platform;

    impl super::PlatformCounters for Platform {
        fn cpu_ticks() -> Option<Vec<crate::telemetry::snapshot::CoreTicks>> {
            None
        }

        fn memory_zones() -> Option<super::MemoryZones> {
            None
        }
    }
}
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use fallback as platform_impl;

pub fn cpu_ticks() -> Option<Vec<CoreTicks>> {
    platform_impl::Platform::cpu_ticks()
}

pub fn memory_zones() -> Option<MemoryZones> {
    platform_impl::Platform::memory_zones()
}
