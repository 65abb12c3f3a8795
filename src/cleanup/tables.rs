//! Data-driven lookup tables for the scanner and the leftover resolver.
//!
//! Classification is table lookup, not scattered conditionals: the known
//! cache roots, the denylist, and the library search locations all live
//! here so they can be versioned and tested in isolation.

use std::path::Path;

use super::plan::Category;

/// Bumped whenever an entry is added, removed, or reclassified.
pub const TABLE_VERSION: u32 = 4;

/// A known cache root under the user's home directory. `owner_process` is
/// the process name whose presence marks the cache as in use.
pub struct CacheRoot {
    pub home_relative: &'static str,
    pub category: Category,
    pub owner_process: Option<&'static str>,
}

pub const CACHE_ROOTS: &[CacheRoot] = &[
    CacheRoot {
        home_relative: "Library/Caches/com.apple.Safari",
        category: Category::BrowserCache,
        owner_process: Some("Safari"),
    },
    CacheRoot {
        home_relative: "Library/Caches/Google/Chrome",
        category: Category::BrowserCache,
        owner_process: Some("Google Chrome"),
    },
    CacheRoot {
        home_relative: "Library/Caches/Firefox",
        category: Category::BrowserCache,
        owner_process: Some("firefox"),
    },
    CacheRoot {
        home_relative: "Library/Caches/company.thebrowser.Browser",
        category: Category::BrowserCache,
        owner_process: Some("Arc"),
    },
    CacheRoot {
        home_relative: "Library/Caches/com.spotify.client",
        category: Category::AppCache,
        owner_process: Some("Spotify"),
    },
    CacheRoot {
        home_relative: "Library/Caches/Homebrew",
        category: Category::AppCache,
        owner_process: None,
    },
    CacheRoot {
        home_relative: "Library/Developer/Xcode/DerivedData",
        category: Category::AppCache,
        owner_process: Some("Xcode"),
    },
    CacheRoot {
        home_relative: "Library/Caches/org.swift.swiftpm",
        category: Category::AppCache,
        owner_process: None,
    },
    CacheRoot {
        home_relative: ".npm/_cacache",
        category: Category::AppCache,
        owner_process: None,
    },
    CacheRoot {
        home_relative: "Library/Caches/pip",
        category: Category::AppCache,
        owner_process: None,
    },
    CacheRoot {
        home_relative: "Library/Logs",
        category: Category::SystemLog,
        owner_process: None,
    },
];

/// The few roots outside the home directory a scan is allowed to touch.
pub struct SystemRoot {
    pub path: &'static str,
    pub category: Category,
}

pub const SYSTEM_ROOTS: &[SystemRoot] = &[
    SystemRoot {
        path: "/tmp",
        category: Category::Tmp,
    },
    SystemRoot {
        path: "/private/tmp",
        category: Category::Tmp,
    },
];

/// System-owned prefixes that are never deletable, wherever they turn up.
pub const DENYLIST_PREFIXES: &[&str] = &[
    "/System",
    "/Library",
    "/Applications",
    "/usr",
    "/bin",
    "/sbin",
    "/opt",
    "/etc",
    "/var/db",
    "/private/var/db",
];

/// User-scope library locations searched for app leftovers, relative to the
/// home directory.
pub const LEFTOVER_LOCATIONS: &[&str] = &[
    "Library/Preferences",
    "Library/Application Support",
    "Library/Caches",
    "Library/Saved Application State",
    "Library/LaunchAgents",
];

/// System-scope equivalents, searched read-only for awareness; matches here
/// are reported as protected and never enter a plan.
pub const SYSTEM_LEFTOVER_LOCATIONS: &[&str] = &["/Library/LaunchAgents", "/Library/LaunchDaemons"];

pub fn is_denied(path: &Path) -> bool {
    DENYLIST_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

pub fn is_allowed_system_root(path: &Path) -> bool {
    SYSTEM_ROOTS.iter().any(|root| path.starts_with(root.path))
}
