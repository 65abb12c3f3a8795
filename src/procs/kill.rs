use sysinfo::{Pid, Signal, System};

pub enum TerminateResult {
    Signaled(u32, &'static str),
    /// The controller applies no denylist beyond the kernel, init, and its
    /// own process; everything else is the caller's decision to confirm.
    Refused(u32, &'static str),
    Failed(u32, String),
    NotFound(u32),
}

/// Sends a graceful SIGTERM, or SIGKILL when `force` is set.
pub fn terminate(sys: &System, pid: u32, force: bool) -> TerminateResult {
    if pid == 0 || pid == 1 {
        return TerminateResult::Refused(pid, "refusing to signal pid 0/1");
    }
    if pid == std::process::id() {
        return TerminateResult::Refused(pid, "refusing to signal own process");
    }

    let signal = if force { Signal::Kill } else { Signal::Term };
    let signal_name = if force { "SIGKILL" } else { "SIGTERM" };

    match sys.process(Pid::from_u32(pid)) {
        Some(process) => match process.kill_with(signal) {
            Some(true) => TerminateResult::Signaled(pid, signal_name),
            Some(false) => TerminateResult::Failed(
                pid,
                format!("Failed to send {signal_name} to PID {pid}"),
            ),
            None => {
                // Signal not supported on this platform, fall back to kill()
                if process.kill() {
                    TerminateResult::Signaled(pid, signal_name)
                } else {
                    TerminateResult::Failed(
                        pid,
                        format!("Failed to kill PID {pid} (permission denied?)"),
                    )
                }
            }
        },
        None => TerminateResult::NotFound(pid),
    }
}
