use std::path::Path;

/// Open-handle probe behind a trait so scan classification stays testable
/// without live processes.
pub trait UsageProbe: Send + Sync {
    /// Whether any live process holds an open handle on `path`.
    fn is_open(&self, path: &Path) -> bool;
}

/// Probe that never reports a handle. Used where the OS offers no cheap
/// open-file query and on the non-macOS development build.
pub struct NoopProbe;

impl UsageProbe for NoopProbe {
    fn is_open(&self, _path: &Path) -> bool {
        false
    }
}

#[cfg(target_os = "macos")]
pub struct LibprocProbe;

#[cfg(target_os = "macos")]
impl UsageProbe for LibprocProbe {
    fn is_open(&self, path: &Path) -> bool {
        use libproc::libproc::proc_pid::{ProcType, listpidspath};
        match path.to_str() {
            Some(p) => listpidspath(ProcType::ProcAllPIDS, p)
                .map(|pids| !pids.is_empty())
                .unwrap_or(false),
            None => false,
        }
    }
}

pub fn default_probe() -> Box<dyn UsageProbe> {
    #[cfg(target_os = "macos")]
    {
        Box::new(LibprocProbe)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(NoopProbe)
    }
}
