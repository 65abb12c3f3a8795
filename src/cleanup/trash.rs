use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where trashed entries land for this user. The executor never unlinks;
/// everything it removes stays recoverable from here.
pub fn trash_dir(home: &Path) -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home.join(".Trash")
    }
    #[cfg(not(target_os = "macos"))]
    {
        home.join(".local/share/Trash/files")
    }
}

/// Moves `path` into `trash` under a collision-free name. The rename is the
/// atomic per-path operation; on failure (cross-device, permissions) the
/// error is returned for per-path reporting, nothing is retried.
pub fn move_to_trash(path: &Path, trash: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(trash)?;
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let dest = unique_destination(trash, Path::new(name));
    fs::rename(path, &dest)?;
    Ok(dest)
}

/// Finder-style de-duplication: "name", then "name 2", "name 3", ...
fn unique_destination(trash: &Path, name: &Path) -> PathBuf {
    let first = trash.join(name);
    if !first.exists() {
        return first;
    }
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());
    for n in 2u32.. {
        let candidate = match &ext {
            Some(ext) => trash.join(format!("{stem} {n}.{ext}")),
            None => trash.join(format!("{stem} {n}")),
        };
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("u32 range exhausted finding a trash destination")
}
