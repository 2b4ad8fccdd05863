//! # Module registry - the authoritative path → [`Module`] map.
//!
//! The registry is shared between the supervisor loop (policy engine and
//! control relay, which run sequentially on it) and any reader. Mutation of a
//! single entry happens inside the write lock via [`ModuleRegistry::update_with`],
//! so concurrent readers never observe a half-updated record.
//!
//! ## Rules
//! - Lookups return copies; nothing holds a reference into the map.
//! - A pid with no matching module is `None`, not an error: callers treat it
//!   as a recoverable condition (log and continue).
//! - Entries are keyed by the module's executable path.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::Module;
use crate::os::Pid;

/// Shared, lock-guarded map of managed modules.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<HashMap<String, Module>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record for `path`.
    pub async fn insert(&self, path: impl Into<String>, module: Module) {
        let mut modules = self.modules.write().await;
        modules.insert(path.into(), module);
    }

    /// Returns a copy of the record for `path`, if registered.
    pub async fn get(&self, path: &str) -> Option<Module> {
        let modules = self.modules.read().await;
        modules.get(path).cloned()
    }

    /// Finds the path of the module currently holding `pid`.
    ///
    /// Linear scan, first match in iteration order. Live pids are unique, so
    /// ties only occur through stale entries (e.g. a downgraded module's old
    /// pid); those are a documented recoverable edge case, not a panic.
    pub async fn find_by_pid(&self, pid: Pid) -> Option<String> {
        let modules = self.modules.read().await;
        modules
            .iter()
            .find(|(_, m)| m.process_id == Some(pid))
            .map(|(path, _)| path.clone())
    }

    /// Runs `f` against the record for `path` under the write lock.
    ///
    /// Returns `None` without calling `f` when the path is not registered.
    /// This is the single mutation primitive: relaunches, kills, and flag
    /// updates all go through here so each change is atomic with respect to
    /// readers.
    pub async fn update_with<F, R>(&self, path: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Module) -> R,
    {
        let mut modules = self.modules.write().await;
        modules.get_mut(path).map(f)
    }

    /// Returns sorted paths of all registered modules.
    pub async fn list(&self) -> Vec<String> {
        let modules = self.modules.read().await;
        let mut paths: Vec<String> = modules.keys().cloned().collect();
        paths.sort_unstable();
        paths
    }

    /// Returns the number of registered modules.
    pub async fn len(&self) -> usize {
        self.modules.read().await.len()
    }

    /// Returns true if no modules are registered.
    pub async fn is_empty(&self) -> bool {
        self.modules.read().await.is_empty()
    }
}
