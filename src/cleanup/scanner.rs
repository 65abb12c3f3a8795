use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::plan::{Category, CleanablePath, CleanupPlan, ProtectionState, ScanError, ScanReport};
use super::tables::{self, CACHE_ROOTS, SYSTEM_ROOTS};
use super::usage::UsageProbe;

/// A cache root resolved to an absolute path, ready to scan.
#[derive(Clone, Debug)]
pub struct ResolvedRoot {
    pub path: PathBuf,
    pub category: Category,
    pub owner_process: Option<String>,
}

/// Everything classification needs besides the candidate path itself.
pub struct ScanContext {
    pub home: PathBuf,
    pub max_depth: usize,
    /// Lowercased names of currently running processes.
    pub running: HashSet<String>,
    pub probe: Box<dyn UsageProbe>,
    /// Roots outside the home directory a scan may still touch. Taken from
    /// the versioned table by default; injected so classification is
    /// testable without depending on where the test tree happens to live.
    pub allowed_roots: Vec<PathBuf>,
}

impl ScanContext {
    pub fn new(home: PathBuf, max_depth: usize) -> Self {
        ScanContext {
            home,
            max_depth,
            running: HashSet::new(),
            probe: crate::cleanup::usage::default_probe(),
            allowed_roots: SYSTEM_ROOTS.iter().map(|r| PathBuf::from(r.path)).collect(),
        }
    }

    fn is_allowed_outside_home(&self, path: &Path) -> bool {
        self.allowed_roots.iter().any(|root| path.starts_with(root))
    }
}

/// The fixed, versioned root set, resolved against a home directory.
/// Category filtering happens here so a scan request names what it wants
/// and the tables stay the single source of truth.
pub fn default_roots(home: &Path, filter: Option<Category>) -> Vec<ResolvedRoot> {
    let mut roots: Vec<ResolvedRoot> = CACHE_ROOTS
        .iter()
        .map(|r| ResolvedRoot {
            path: home.join(r.home_relative),
            category: r.category,
            owner_process: r.owner_process.map(str::to_string),
        })
        .collect();
    roots.extend(SYSTEM_ROOTS.iter().map(|r| ResolvedRoot {
        path: PathBuf::from(r.path),
        category: r.category,
        owner_process: None,
    }));
    match filter {
        Some(category) => roots.retain(|r| r.category == category),
        None => {}
    }
    roots
}

/// Scans the given roots and classifies every immediate child as a cleanup
/// candidate. Roots that do not exist are simply absent from the report;
/// entries that fail to stat mid-enumeration are recorded as scan errors.
pub fn scan_roots(roots: &[ResolvedRoot], ctx: &ScanContext, cancel: &AtomicBool) -> ScanReport {
    let mut candidates = Vec::new();
    let mut errors = Vec::new();
    let mut truncated = false;

    for root in roots {
        if cancel.load(Ordering::Relaxed) {
            truncated = true;
            break;
        }
        // Never descend through a symlinked root: scope could escape.
        match fs::symlink_metadata(&root.path) {
            Ok(meta) if meta.is_dir() && !meta.file_type().is_symlink() => {}
            Ok(_) | Err(_) => continue,
        }

        let entries = match fs::read_dir(&root.path) {
            Ok(entries) => entries,
            Err(err) => {
                errors.push(ScanError {
                    path: root.path.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        for entry in entries {
            if cancel.load(Ordering::Relaxed) {
                truncated = true;
                break;
            }
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    errors.push(ScanError {
                        path: root.path.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let path = entry.path();
            match candidate_for(&path, root, ctx, &mut errors) {
                Some(candidate) => candidates.push(candidate),
                None => {}
            }
        }
    }

    debug!(
        candidates = candidates.len(),
        errors = errors.len(),
        truncated,
        "scan complete"
    );
    let (plan, excluded) = CleanupPlan::from_candidates(candidates);
    ScanReport {
        plan,
        excluded,
        errors,
        truncated,
    }
}

fn candidate_for(
    path: &Path,
    root: &ResolvedRoot,
    ctx: &ScanContext,
    errors: &mut Vec<ScanError>,
) -> Option<CleanablePath> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            // Permission denied or vanished mid-scan: accounted for, never
            // silently dropped.
            errors.push(ScanError {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
            return None;
        }
    };

    let size_bytes = if meta.is_dir() && !meta.file_type().is_symlink() {
        dir_size(path, ctx.max_depth, errors)
    } else {
        meta.len()
    };

    Some(CleanablePath {
        path: path.to_path_buf(),
        size_bytes,
        category: root.category,
        protection: classify(path, root, ctx),
        owner_process: root.owner_process.clone(),
    })
}

/// Protection rules, applied in order of severity: location first, then
/// liveness.
pub fn classify(path: &Path, root: &ResolvedRoot, ctx: &ScanContext) -> ProtectionState {
    if !path.starts_with(&ctx.home) && !ctx.is_allowed_outside_home(path) {
        return ProtectionState::Protected;
    }
    if tables::is_denied(path) && !ctx.is_allowed_outside_home(path) {
        return ProtectionState::Protected;
    }
    if let Some(owner) = &root.owner_process
        && ctx.running.contains(&owner.to_lowercase())
    {
        return ProtectionState::InUse;
    }
    if ctx.probe.is_open(path) {
        return ProtectionState::InUse;
    }
    ProtectionState::Deletable
}

/// Bounded-depth recursive size of a directory, via an explicit stack.
/// Symlinks contribute their own metadata length and are never followed.
pub fn dir_size(path: &Path, max_depth: usize, errors: &mut Vec<ScanError>) -> u64 {
    let mut total = 0u64;
    let mut stack = vec![(path.to_path_buf(), 0usize)];

    while let Some((dir, depth)) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                errors.push(ScanError {
                    path: dir,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        for entry in entries.flatten() {
            let entry_path = entry.path();
            let meta = match fs::symlink_metadata(&entry_path) {
                Ok(meta) => meta,
                Err(err) => {
                    errors.push(ScanError {
                        path: entry_path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            if meta.file_type().is_symlink() {
                total += meta.len();
            } else if meta.is_dir() {
                if depth + 1 <= max_depth {
                    stack.push((entry_path, depth + 1));
                }
            } else {
                total += meta.len();
            }
        }
    }
    total
}
