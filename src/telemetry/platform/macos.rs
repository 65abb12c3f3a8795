use super::{MemoryZones, PlatformCounters};
use crate::telemetry::snapshot::CoreTicks;

pub struct Platform;

const PROCESSOR_CPU_LOAD_INFO: libc::c_int = 2;
const HOST_VM_INFO64: libc::c_int = 4;

const CPU_STATE_USER: usize = 0;
const CPU_STATE_SYSTEM: usize = 1;
const CPU_STATE_IDLE: usize = 2;
const CPU_STATE_NICE: usize = 3;
const CPU_STATE_MAX: usize = 4;

// Layout of mach/vm_statistics.h `struct vm_statistics64`.
#[repr(C)]
#[derive(Default)]
struct VmStatistics64 {
    free_count: u32,
    active_count: u32,
    inactive_count: u32,
    wire_count: u32,
    zero_fill_count: u64,
    reactivations: u64,
    pageins: u64,
    pageouts: u64,
    faults: u64,
    cow_faults: u64,
    lookups: u64,
    hits: u64,
    purges: u64,
    purgeable_count: u32,
    speculative_count: u32,
    decompressions: u64,
    compressions: u64,
    swapins: u64,
    swapouts: u64,
    compressor_page_count: u32,
    throttled_count: u32,
    external_page_count: u32,
    internal_page_count: u32,
    total_uncompressed_pages_in_compressor: u64,
}

unsafe extern "C" {
    fn mach_host_self() -> u32;
    fn host_processor_info(
        host: u32,
        flavor: libc::c_int,
        out_processor_count: *mut u32,
        out_processor_info: *mut *mut libc::c_int,
        out_processor_info_count: *mut u32,
    ) -> libc::c_int;
    fn host_statistics64(
        host: u32,
        flavor: libc::c_int,
        host_info: *mut libc::c_int,
        count: *mut u32,
    ) -> libc::c_int;
    fn vm_deallocate(task: u32, address: usize, size: usize) -> libc::c_int;
    static mach_task_self_: u32;
}

impl PlatformCounters for Platform {
    fn cpu_ticks() -> Option<Vec<CoreTicks>> {
        let mut cpu_count: u32 = 0;
        let mut info: *mut libc::c_int = std::ptr::null_mut();
        let mut info_count: u32 = 0;

        // SAFETY: out-pointers are valid for writes; the kernel-allocated
        // info array is deallocated below before returning.
        let kr = unsafe {
            host_processor_info(
                mach_host_self(),
                PROCESSOR_CPU_LOAD_INFO,
                &mut cpu_count,
                &mut info,
                &mut info_count,
            )
        };
        if kr != 0 || info.is_null() {
            return None;
        }

        let expected = cpu_count as usize * CPU_STATE_MAX;
        let mut cores = Vec::with_capacity(cpu_count as usize);
        if info_count as usize >= expected {
            let ticks = unsafe { std::slice::from_raw_parts(info, expected) };
            for core in 0..cpu_count as usize {
                let base = core * CPU_STATE_MAX;
                // Tick counters are unsigned 32-bit in the kernel; the array
                // is typed as c_int, so go through u32 to avoid sign bleed.
                let user = ticks[base + CPU_STATE_USER] as u32 as u64;
                let system = ticks[base + CPU_STATE_SYSTEM] as u32 as u64;
                let idle = ticks[base + CPU_STATE_IDLE] as u32 as u64;
                let nice = ticks[base + CPU_STATE_NICE] as u32 as u64;
                let busy = user + system + nice;
                cores.push(CoreTicks {
                    busy,
                    total: busy + idle,
                });
            }
        }

        unsafe {
            vm_deallocate(
                mach_task_self_,
                info as usize,
                info_count as usize * std::mem::size_of::<libc::c_int>(),
            );
        }

        if cores.is_empty() { None } else { Some(cores) }
    }

    fn memory_zones() -> Option<MemoryZones> {
        let mut stats = VmStatistics64::default();
        let mut count =
            (std::mem::size_of::<VmStatistics64>() / std::mem::size_of::<libc::c_int>()) as u32;

        let kr = unsafe {
            host_statistics64(
                mach_host_self(),
                HOST_VM_INFO64,
                (&mut stats as *mut VmStatistics64).cast(),
                &mut count,
            )
        };
        if kr != 0 {
            return None;
        }

        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return None;
        }
        let page = page_size as u64;

        Some(MemoryZones {
            active: stats.active_count as u64 * page,
            wired: stats.wire_count as u64 * page,
            compressed: stats.compressor_page_count as u64 * page,
            free: stats.free_count as u64 * page,
        })
    }
}
