//! # Module directory scanner.
//!
//! Lists the module executables the supervisor should launch at startup.
//! Currently that is exactly the regular files in the configured directory;
//! a nested layout would slot in here if one ever becomes necessary.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Returns the module executables found in `dir`, sorted by path.
///
/// Sorting keeps channel-key assignment deterministic across restarts.
/// Subdirectories are skipped. An unreadable directory is not fatal: the
/// supervisor starts with zero modules and a warning instead of aborting.
pub fn modules_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "unable to read module directory");
            return Vec::new();
        }
    };

    let mut modules: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    modules.sort_unstable();
    modules
}
