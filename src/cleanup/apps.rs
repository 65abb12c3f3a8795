use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::leftovers;
use super::plan::AppRecord;

/// The only roots application discovery looks at. System-bundled apps under
/// /System are excluded by policy, not by permission failure.
pub fn default_app_roots(home: &Path) -> Vec<PathBuf> {
    vec![PathBuf::from("/Applications"), home.join("Applications")]
}

/// Enumerates `.app` bundles under the given roots. `running` holds
/// lowercased live process names for the is-running flag; leftovers are
/// resolved separately, on demand.
pub fn discover_apps(roots: &[PathBuf], running: &HashSet<String>) -> Vec<AppRecord> {
    let mut apps = Vec::new();
    for root in roots {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("app") {
                continue;
            }
            let Some(display_name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let display_name = display_name.to_string();
            let bundle_id = read_bundle_identifier(&path)
                .unwrap_or_else(|| fallback_identifier(&display_name));
            let is_running = running.contains(&display_name.to_lowercase());
            apps.push(AppRecord {
                bundle_id,
                display_name,
                install_path: path,
                is_running,
                leftovers: Vec::new(),
            });
        }
    }
    apps.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    debug!(count = apps.len(), "app discovery complete");
    apps
}

/// Fills in the record's associated leftovers. A running app's artifacts
/// come back marked in use, so plans built from them carry the warning.
pub fn attach_leftovers(record: &mut AppRecord, home: &Path, max_depth: usize) {
    let (found, _errors) =
        leftovers::resolve_leftovers(&record.bundle_id, home, max_depth, record.is_running);
    record.leftovers = found;
}

/// CFBundleIdentifier from the bundle's Info.plist. Handles the XML form;
/// a binary plist (or a malformed one) yields `None` and the caller falls
/// back to a name-derived identifier.
fn read_bundle_identifier(bundle: &Path) -> Option<String> {
    let plist = bundle.join("Contents/Info.plist");
    let contents = fs::read_to_string(plist).ok()?;
    extract_plist_string(&contents, "CFBundleIdentifier")
}

fn fallback_identifier(display_name: &str) -> String {
    let slug: String = display_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    format!("local.{slug}")
}

/// Minimal scan for `<key>NAME</key><string>VALUE</string>` in plist XML.
fn extract_plist_string(xml: &str, key: &str) -> Option<String> {
    let needle = format!("<key>{key}</key>");
    let after_key = &xml[xml.find(&needle)? + needle.len()..];
    let start = after_key.find("<string>")? + "<string>".len();
    let rest = &after_key[start..];
    let end = rest.find("</string>")?;
    let value = rest[..end].trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
