use std::fs;
use std::path::{Path, PathBuf};

use super::plan::{Category, CleanablePath, ProtectionState, ScanError};
use super::scanner;
use super::tables::{LEFTOVER_LOCATIONS, SYSTEM_LEFTOVER_LOCATIONS};

/// Whether a directory entry's name belongs to the given bundle identifier.
///
/// Exact match, or the identifier followed by a non-alphanumeric boundary
/// ("com.acme.app.plist", "com.acme.app.savedState"). Substring-only matches
/// are rejected so "com.acme.app" never claims "com.acme.app2" or an
/// unrelated vendor sibling: precision over completeness.
pub fn matches_identifier(entry_name: &str, bundle_id: &str) -> bool {
    if bundle_id.is_empty() {
        return false;
    }
    if entry_name == bundle_id {
        return true;
    }
    match entry_name.strip_prefix(bundle_id) {
        Some(rest) => rest
            .chars()
            .next()
            .is_some_and(|c| !c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Finds every filesystem artifact associated with a bundle identifier
/// across the standard library locations. User-scope matches are deletable
/// candidates, unless the owning app is running, in which case they are
/// marked in use so any plan built from them carries the running-owner
/// warning. System-scope launch agents/daemons are reported protected, for
/// awareness only.
pub fn resolve_leftovers(
    bundle_id: &str,
    home: &Path,
    max_depth: usize,
    owner_running: bool,
) -> (Vec<CleanablePath>, Vec<ScanError>) {
    let mut found = Vec::new();
    let mut errors = Vec::new();

    let user_scope = if owner_running {
        ProtectionState::InUse
    } else {
        ProtectionState::Deletable
    };
    for location in LEFTOVER_LOCATIONS {
        let dir = home.join(location);
        collect_matches(
            &dir,
            bundle_id,
            user_scope,
            max_depth,
            &mut found,
            &mut errors,
        );
    }
    for location in SYSTEM_LEFTOVER_LOCATIONS {
        collect_matches(
            Path::new(location),
            bundle_id,
            ProtectionState::Protected,
            max_depth,
            &mut found,
            &mut errors,
        );
    }

    (found, errors)
}

fn collect_matches(
    dir: &Path,
    bundle_id: &str,
    protection: ProtectionState,
    max_depth: usize,
    found: &mut Vec<CleanablePath>,
    errors: &mut Vec<ScanError>,
) {
    let entries = match fs::read_dir(dir) {
        // Absent locations are normal; only a present-but-unreadable one is
        // worth recording.
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
        Err(err) => {
            errors.push(ScanError {
                path: dir.to_path_buf(),
                reason: err.to_string(),
            });
            return;
        }
        Ok(entries) => entries,
    };

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !matches_identifier(name, bundle_id) {
            continue;
        }
        let path = entry.path();
        let size_bytes = entry_size(&path, max_depth, errors);
        found.push(CleanablePath {
            path,
            size_bytes,
            category: Category::AppLeftover,
            protection,
            owner_process: None,
        });
    }
}

fn entry_size(path: &Path, max_depth: usize, errors: &mut Vec<ScanError>) -> u64 {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() && !meta.file_type().is_symlink() => {
            scanner::dir_size(path, max_depth, errors)
        }
        Ok(meta) => meta.len(),
        Err(err) => {
            errors.push(ScanError {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
            0
        }
    }
}
