use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use super::plan::{CleanablePath, CleanupPlan, CleanupResult, PathOutcome, PathStatus};
use super::tables;
use super::trash;
use super::usage::{self, UsageProbe};
use crate::error::EngineError;

/// Execution environment for a confirmed plan.
pub struct ExecuteOptions {
    pub home: PathBuf,
    pub trash_dir: PathBuf,
    /// Same allowed-outside-home set the scan used, for re-verification.
    pub allowed_roots: Vec<PathBuf>,
    /// Open-handle probe, re-consulted per path at removal time.
    pub probe: Box<dyn UsageProbe>,
    /// Lowercased names of currently running processes.
    pub running: HashSet<String>,
}

impl ExecuteOptions {
    pub fn new(home: PathBuf) -> Self {
        let trash_dir = trash::trash_dir(&home);
        ExecuteOptions {
            home,
            trash_dir,
            allowed_roots: tables::SYSTEM_ROOTS
                .iter()
                .map(|r| PathBuf::from(r.path))
                .collect(),
            probe: usage::default_probe(),
            running: HashSet::new(),
        }
    }
}

/// Carries out a reviewed, confirmed plan. Never decides what to delete:
/// the plan is taken as-is, each path re-verified immediately before its
/// move, each outcome recorded independently. One failure never aborts the
/// rest; `removed + skipped` always equals the plan's path count.
pub fn execute(
    plan: &CleanupPlan,
    confirmed: bool,
    opts: &ExecuteOptions,
    cancel: &AtomicBool,
) -> Result<CleanupResult, EngineError> {
    if !confirmed {
        // Contract violation by the caller; refuse before touching anything.
        return Err(EngineError::ConfirmationMissing);
    }

    let mut result = CleanupResult::default();
    let mut cancelled = false;

    for entry in plan.paths() {
        // Cooperative cancellation between path operations; outcomes that
        // already happened stand.
        if !cancelled && cancel.load(Ordering::Relaxed) {
            cancelled = true;
        }
        if cancelled {
            result.outcomes.push(PathOutcome {
                path: entry.path.clone(),
                status: PathStatus::SkippedError("cancelled".to_string()),
            });
            result.skipped += 1;
            continue;
        }

        let status = remove_one(entry, opts);
        match &status {
            PathStatus::Removed => {
                result.removed += 1;
                result.bytes_freed += entry.size_bytes;
            }
            _ => {
                result.skipped += 1;
                warn!(path = %entry.path.display(), status = ?status, "path skipped");
            }
        }
        result.outcomes.push(PathOutcome {
            path: entry.path.clone(),
            status,
        });
    }

    info!(
        removed = result.removed,
        skipped = result.skipped,
        bytes_freed = result.bytes_freed,
        "execution finished"
    );
    Ok(result)
}

/// Re-verify then move. The re-check defends against the path changing
/// between scan and execute: a vanished path is a race, not a failure; one
/// that no longer passes the protection rules, or that became in use (its
/// app launched, a handle opened), is skipped, never deleted blind.
fn remove_one(entry: &CleanablePath, opts: &ExecuteOptions) -> PathStatus {
    match fs::symlink_metadata(&entry.path) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return PathStatus::SkippedMissing;
        }
        Err(err) => return PathStatus::SkippedError(err.to_string()),
        Ok(_) => {}
    }

    if !still_deletable(&entry.path, opts) {
        return PathStatus::SkippedProtected;
    }
    if now_in_use(entry, opts) {
        return PathStatus::SkippedInUse;
    }

    match trash::move_to_trash(&entry.path, &opts.trash_dir) {
        Ok(_) => PathStatus::Removed,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => PathStatus::SkippedMissing,
        Err(err) => PathStatus::SkippedError(err.to_string()),
    }
}

fn still_deletable(path: &Path, opts: &ExecuteOptions) -> bool {
    let allowed_outside = opts.allowed_roots.iter().any(|root| path.starts_with(root));
    if !path.starts_with(&opts.home) && !allowed_outside {
        return false;
    }
    if tables::is_denied(path) && !allowed_outside {
        return false;
    }
    true
}

fn now_in_use(entry: &CleanablePath, opts: &ExecuteOptions) -> bool {
    if let Some(owner) = &entry.owner_process
        && opts.running.contains(&owner.to_lowercase())
    {
        return true;
    }
    opts.probe.is_open(&entry.path)
}
