//! # Recovery policy: where a downgraded module relaunches from.
//!
//! When an external authority confirms a downgrade over the control topic,
//! the module is relaunched at a *recovery target*. Whether that target is
//! the same executable or a reduced/alternate binary is a platform decision,
//! so it lives behind a trait instead of being hard-coded.
//!
//! [`SamePath`] is the default: relaunch the executable the module was
//! registered under. A platform that ships fallback binaries implements
//! [`RecoveryPolicy`] to map module paths onto them; the registry key and
//! channel key stay the same either way.

use std::path::{Path, PathBuf};

/// Chooses the executable for a downgrade-confirmed relaunch.
pub trait RecoveryPolicy: Send + Sync + 'static {
    /// Returns the executable to launch for the module registered at `path`.
    fn target(&self, path: &Path) -> PathBuf;
}

/// Default recovery: relaunch the same executable.
#[derive(Default)]
pub struct SamePath;

impl RecoveryPolicy for SamePath {
    fn target(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}
