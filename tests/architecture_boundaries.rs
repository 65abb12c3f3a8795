use std::fs;
use std::path::{Path, PathBuf};

fn rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn rel(path: &Path) -> String {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();
    rel.replace('\\', "/")
}

#[test]
fn cleanup_does_not_depend_on_telemetry() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/cleanup");
    let mut violations = Vec::new();

    for file in rs_files(&root) {
        let content = fs::read_to_string(&file).unwrap_or_default();
        for forbidden in ["crate::telemetry", "crate::procs"] {
            if content.contains(forbidden) {
                violations.push(format!(
                    "{} imports forbidden dependency `{}`",
                    rel(&file),
                    forbidden
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Cleanup layering violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn telemetry_does_not_depend_on_cleanup() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/telemetry");
    let mut violations = Vec::new();

    for file in rs_files(&root) {
        let content = fs::read_to_string(&file).unwrap_or_default();
        if content.contains("crate::cleanup") {
            violations.push(format!("{} imports `crate::cleanup` directly", rel(&file)));
        }
    }

    assert!(
        violations.is_empty(),
        "Telemetry layering violations:\n{}",
        violations.join("\n")
    );
}

#[test]
fn target_os_cfg_is_scoped_to_platform_modules() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut violations = Vec::new();

    for file in rs_files(&root) {
        let content = fs::read_to_string(&file).unwrap_or_default();
        if !content.contains("target_os") {
            continue;
        }

        let rel_path = rel(&file);
        let allowed = rel_path.starts_with("src/telemetry/platform/")
            || rel_path == "src/cleanup/usage.rs"
            || rel_path == "src/cleanup/trash.rs";
        if !allowed {
            violations.push(format!(
                "{} contains `target_os` cfg but is outside allowed boundary",
                rel_path
            ));
        }
    }

    assert!(
        violations.is_empty(),
        "Unexpected target_os cfg usage:\n{}",
        violations.join("\n")
    );
}

#[test]
fn executor_never_consults_the_root_tables_for_selection() {
    // The executor re-verifies protection but must not choose what to
    // delete; selection lives in the scanner.
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("src/cleanup/executor.rs");
    let content = fs::read_to_string(&path).unwrap();
    for forbidden in ["CACHE_ROOTS", "LEFTOVER_LOCATIONS", "default_roots"] {
        assert!(
            !content.contains(forbidden),
            "executor.rs references `{forbidden}`; selection belongs to the scanner"
        );
    }
}
