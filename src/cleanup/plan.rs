use std::path::PathBuf;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    BrowserCache,
    AppCache,
    SystemLog,
    Tmp,
    AppLeftover,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::BrowserCache => "browser cache",
            Category::AppCache => "app cache",
            Category::SystemLog => "system log",
            Category::Tmp => "tmp",
            Category::AppLeftover => "app leftover",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtectionState {
    Deletable,
    Protected,
    InUse,
}

/// A filesystem entry considered for removal, with its protection
/// classification. Protected and in-use entries are reported for review but
/// can never enter an executable plan.
#[derive(Clone, Debug, Serialize)]
pub struct CleanablePath {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub category: Category,
    pub protection: ProtectionState,
    /// Process name whose presence marks this entry as in use, carried from
    /// the root table so the executor can re-check liveness at removal time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_process: Option<String>,
}

/// The reviewable, immutable output of a scan: an ordered set of deletable
/// paths plus their aggregate size. Construction filters out anything not
/// deletable, so the plan invariant holds by type, not by discipline.
/// Re-scanning produces a new plan; a plan is never partially mutated.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CleanupPlan {
    paths: Vec<CleanablePath>,
    total_bytes: u64,
    /// Set when some entry's owning app was running at scan time; the UI
    /// must surface a warning before accepting such a plan.
    pub running_owner_warning: bool,
}

impl CleanupPlan {
    /// Splits scan candidates into the executable plan (deletable only) and
    /// the entries excluded for visibility.
    pub fn from_candidates(candidates: Vec<CleanablePath>) -> (Self, Vec<CleanablePath>) {
        let mut paths = Vec::new();
        let mut excluded = Vec::new();
        for c in candidates {
            match c.protection {
                ProtectionState::Deletable => paths.push(c),
                _ => excluded.push(c),
            }
        }
        let total_bytes = paths.iter().map(|p| p.size_bytes).sum();
        let running_owner_warning = excluded
            .iter()
            .any(|c| c.protection == ProtectionState::InUse);
        (
            CleanupPlan {
                paths,
                total_bytes,
                running_owner_warning,
            },
            excluded,
        )
    }

    pub fn paths(&self) -> &[CleanablePath] {
        &self.paths
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A path the scanner enumerated but could not inspect. Recorded, never
/// silently dropped: the scan accounts for everything it touched.
#[derive(Clone, Debug, Serialize)]
pub struct ScanError {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ScanReport {
    pub plan: CleanupPlan,
    /// Protected and in-use entries, reported for review only.
    pub excluded: Vec<CleanablePath>,
    pub errors: Vec<ScanError>,
    /// Set when the scan was cancelled before covering every root; the plan
    /// is valid but partial, not the full survey.
    pub truncated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum PathStatus {
    Removed,
    SkippedProtected,
    /// The path was held open, or its owning app running, at removal time.
    SkippedInUse,
    /// The path vanished between scan and execute; a race, not a failure.
    SkippedMissing,
    SkippedError(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct PathOutcome {
    pub path: PathBuf,
    pub status: PathStatus,
}

/// Outcome of executing a plan. `removed + skipped` always equals the input
/// plan's path count.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CleanupResult {
    pub outcomes: Vec<PathOutcome>,
    pub bytes_freed: u64,
    pub removed: usize,
    pub skipped: usize,
}

/// An installed application and the artifacts associated with it.
#[derive(Clone, Debug, Serialize)]
pub struct AppRecord {
    pub bundle_id: String,
    pub display_name: String,
    pub install_path: PathBuf,
    pub is_running: bool,
    pub leftovers: Vec<CleanablePath>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, size: u64, protection: ProtectionState) -> CleanablePath {
        CleanablePath {
            path: PathBuf::from(format!("/home/user/Library/Caches/{name}")),
            size_bytes: size,
            category: Category::AppCache,
            protection,
            owner_process: None,
        }
    }

    #[test]
    fn plan_contains_only_deletable_paths() {
        let (plan, excluded) = CleanupPlan::from_candidates(vec![
            candidate("a", 100, ProtectionState::Deletable),
            candidate("b", 200, ProtectionState::Protected),
            candidate("c", 300, ProtectionState::InUse),
            candidate("d", 400, ProtectionState::Deletable),
        ]);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.total_bytes(), 500);
        assert_eq!(excluded.len(), 2);
        assert!(
            plan.paths()
                .iter()
                .all(|p| p.protection == ProtectionState::Deletable)
        );
    }

    #[test]
    fn in_use_entry_raises_running_owner_warning() {
        let (plan, _) = CleanupPlan::from_candidates(vec![
            candidate("a", 1, ProtectionState::Deletable),
            candidate("b", 2, ProtectionState::InUse),
        ]);
        assert!(plan.running_owner_warning);

        let (quiet, _) =
            CleanupPlan::from_candidates(vec![candidate("a", 1, ProtectionState::Deletable)]);
        assert!(!quiet.running_owner_warning);
    }

    #[test]
    fn empty_scan_yields_empty_plan() {
        let (plan, excluded) = CleanupPlan::from_candidates(Vec::new());
        assert!(plan.is_empty());
        assert_eq!(plan.total_bytes(), 0);
        assert!(excluded.is_empty());
    }
}
