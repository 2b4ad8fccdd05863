//! # Launcher: spawn modules and keep the registry truthful about it.
//!
//! The launcher is the only place that pairs a [`ProcessControl::spawn`] call
//! with the matching registry mutation. Relaunches run inside the registry
//! write lock, so a reader can never observe a module whose pid and flags
//! disagree.
//!
//! ## Rules
//! - A failed spawn never registers a pid: the entry is written (or left)
//!   with `process_id = None` and stays recoverable over the control topic.
//! - Relaunch reuses the module's channel key, always.
//! - A downgrade-confirmed relaunch resolves its executable through the
//!   [`RecoveryPolicy`]; every other relaunch uses the registered path.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::{error, info};

use crate::error::ProcessError;
use crate::modules::{Module, ModuleRegistry};
use crate::os::{modules_in, Pid, ProcessControl};
use crate::policies::RecoveryPolicy;

/// What a kill command did to a registered module.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum KillOutcome {
    /// SIGTERM went out to this pid; a death report will follow.
    Signaled(Pid),
    /// The module had no live process; nothing was sent and the record is
    /// untouched.
    AlreadyDead,
}

/// Spawns module processes and applies the matching registry mutations.
pub(crate) struct Launcher {
    registry: Arc<ModuleRegistry>,
    proc: Arc<dyn ProcessControl>,
    recovery: Arc<dyn RecoveryPolicy>,
}

impl Launcher {
    pub(crate) fn new(
        registry: Arc<ModuleRegistry>,
        proc: Arc<dyn ProcessControl>,
        recovery: Arc<dyn RecoveryPolicy>,
    ) -> Self {
        Self {
            registry,
            proc,
            recovery,
        }
    }

    /// Launches every module executable in `dir`, assigning consecutive
    /// channel keys from `start_key`. Returns the next free key.
    ///
    /// Spawn failures are logged and the module is registered dead; an
    /// unreadable directory yields zero modules (the scanner already warned).
    pub(crate) async fn launch_all(&self, dir: &Path, start_key: i64) -> i64 {
        let mut key = start_key;
        for path in modules_in(dir) {
            let pid = match self.proc.spawn(&path, key) {
                Ok(pid) => {
                    info!(module = %path.display(), pid, channel_key = key, "module launched");
                    Some(pid)
                }
                Err(e) => {
                    error!(module = %path.display(), error = %e, "initial launch failed; module registered dead");
                    None
                }
            };
            let path = path.to_string_lossy().into_owned();
            self.registry.insert(path, Module::new(pid, key)).await;
            key += 1;
        }
        key
    }

    /// Relaunches the module registered at `path`, storing `early_deaths` as
    /// its suspicious-death count.
    ///
    /// Clears `killed` and `downgrade_requested`, stamps a fresh launch time,
    /// and keeps the channel key. Returns `None` when `path` is not
    /// registered. On spawn failure the entry is marked dead
    /// (`process_id = None`) and otherwise left intact, so the module can
    /// still be recovered later.
    pub(crate) async fn relaunch(
        &self,
        path: &str,
        early_deaths: u32,
    ) -> Option<Result<Pid, ProcessError>> {
        let proc = Arc::clone(&self.proc);
        let recovery = Arc::clone(&self.recovery);

        self.registry
            .update_with(path, move |m| {
                let exe = if m.downgrade_requested {
                    recovery.target(Path::new(path))
                } else {
                    PathBuf::from(path)
                };
                match proc.spawn(&exe, m.channel_key) {
                    Ok(pid) => {
                        m.process_id = Some(pid);
                        m.killed = false;
                        m.downgrade_requested = false;
                        m.early_death_count = early_deaths;
                        m.launched_at = SystemTime::now();
                        Ok(pid)
                    }
                    Err(e) => {
                        m.process_id = None;
                        Err(e)
                    }
                }
            })
            .await
    }

    /// Marks the module at `path` as intentionally killed and asks the OS to
    /// terminate its process.
    ///
    /// The flag is set before the signal goes out so the resulting death is
    /// always classified intentional. A module with no live pid is left
    /// untouched and reported as [`KillOutcome::AlreadyDead`]. Returns `None`
    /// when `path` is not registered.
    pub(crate) async fn kill(&self, path: &str) -> Option<Result<KillOutcome, ProcessError>> {
        let pid = self
            .registry
            .update_with(path, |m| {
                let pid = m.process_id?;
                m.killed = true;
                Some(pid)
            })
            .await?;

        let res = match pid {
            Some(pid) => self.proc.terminate(pid).map(|()| KillOutcome::Signaled(pid)),
            None => Ok(KillOutcome::AlreadyDead),
        };
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::SamePath;
    use crate::testutil::FakeProc;
    use std::fs;

    fn launcher_with(proc: Arc<FakeProc>) -> (Launcher, Arc<ModuleRegistry>) {
        let registry = Arc::new(ModuleRegistry::new());
        let launcher = Launcher::new(Arc::clone(&registry), proc, Arc::new(SamePath));
        (launcher, registry)
    }

    #[tokio::test]
    async fn launch_all_assigns_consecutive_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("alpha"), b"").unwrap();
        fs::write(dir.path().join("beta"), b"").unwrap();

        let proc = Arc::new(FakeProc::new(100));
        let (launcher, registry) = launcher_with(Arc::clone(&proc));

        let next = launcher.launch_all(dir.path(), 1000).await;
        assert_eq!(next, 1002);
        assert_eq!(registry.len().await, 2);

        let alpha = registry
            .get(&dir.path().join("alpha").to_string_lossy())
            .await
            .unwrap();
        let beta = registry
            .get(&dir.path().join("beta").to_string_lossy())
            .await
            .unwrap();
        assert_eq!(alpha.channel_key, 1000);
        assert_eq!(beta.channel_key, 1001);
        assert!(alpha.process_id.is_some());
        assert_ne!(alpha.process_id, beta.process_id);
    }

    #[tokio::test]
    async fn launch_all_registers_failed_spawns_as_dead() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mod"), b"").unwrap();

        let proc = Arc::new(FakeProc::new(100));
        proc.set_fail(true);
        let (launcher, registry) = launcher_with(proc);

        launcher.launch_all(dir.path(), 50).await;
        let m = registry
            .get(&dir.path().join("mod").to_string_lossy())
            .await
            .unwrap();
        assert_eq!(m.process_id, None);
        assert_eq!(m.channel_key, 50);
    }

    #[tokio::test]
    async fn relaunch_keeps_key_and_clears_flags() {
        let proc = Arc::new(FakeProc::new(500));
        let (launcher, registry) = launcher_with(Arc::clone(&proc));
        let mut record = Module::new(Some(42), 9);
        record.killed = true;
        record.early_death_count = 3;
        registry.insert("m", record).await;

        let pid = launcher.relaunch("m", 0).await.unwrap().unwrap();
        let m = registry.get("m").await.unwrap();
        assert_eq!(m.process_id, Some(pid));
        assert_eq!(m.channel_key, 9);
        assert!(!m.killed);
        assert!(!m.downgrade_requested);
        assert_eq!(m.early_death_count, 0);
        assert_eq!(proc.spawned().last().unwrap().1, 9);
    }

    #[tokio::test]
    async fn relaunch_failure_leaves_module_dead() {
        let proc = Arc::new(FakeProc::new(500));
        let (launcher, registry) = launcher_with(Arc::clone(&proc));
        registry.insert("m", Module::new(Some(42), 9)).await;

        proc.set_fail(true);
        let res = launcher.relaunch("m", 0).await.unwrap();
        assert!(res.is_err());

        let m = registry.get("m").await.unwrap();
        assert_eq!(m.process_id, None);
        assert_eq!(m.channel_key, 9);
    }

    #[tokio::test]
    async fn relaunch_unregistered_path_is_none() {
        let proc = Arc::new(FakeProc::new(500));
        let (launcher, _registry) = launcher_with(proc);
        assert!(launcher.relaunch("ghost", 0).await.is_none());
    }

    #[tokio::test]
    async fn kill_marks_then_signals() {
        let proc = Arc::new(FakeProc::new(500));
        let (launcher, registry) = launcher_with(Arc::clone(&proc));
        registry.insert("m", Module::new(Some(42), 9)).await;

        let outcome = launcher.kill("m").await.unwrap().unwrap();
        assert_eq!(outcome, KillOutcome::Signaled(42));
        assert!(registry.get("m").await.unwrap().killed);
        assert_eq!(proc.terminated(), vec![42]);
    }

    #[tokio::test]
    async fn kill_of_dead_module_is_noop() {
        let proc = Arc::new(FakeProc::new(500));
        let (launcher, registry) = launcher_with(Arc::clone(&proc));
        registry.insert("m", Module::new(None, 9)).await;

        let outcome = launcher.kill("m").await.unwrap().unwrap();
        assert_eq!(outcome, KillOutcome::AlreadyDead);
        assert!(!registry.get("m").await.unwrap().killed);
        assert!(proc.terminated().is_empty());
    }

    /// Maps every module to a sibling binary under `./fallback`.
    struct FallbackDir;

    impl RecoveryPolicy for FallbackDir {
        fn target(&self, path: &Path) -> PathBuf {
            match path.file_name() {
                Some(name) => Path::new("./fallback").join(name),
                None => path.to_path_buf(),
            }
        }
    }

    #[tokio::test]
    async fn downgrade_confirmed_relaunch_spawns_recovery_target() {
        let proc = Arc::new(FakeProc::new(500));
        let registry = Arc::new(ModuleRegistry::new());
        let launcher = Launcher::new(
            Arc::clone(&registry),
            Arc::clone(&proc) as Arc<dyn ProcessControl>,
            Arc::new(FallbackDir),
        );
        let mut record = Module::new(Some(42), 9);
        record.downgrade_requested = true;
        registry.insert("./modules/imager", record).await;

        let pid = launcher.relaunch("./modules/imager", 0).await.unwrap().unwrap();

        // the fallback binary was spawned, on the original channel key
        assert_eq!(proc.spawned(), vec![(PathBuf::from("./fallback/imager"), 9)]);
        // the record stays keyed under the registered path
        assert!(registry.get("./fallback/imager").await.is_none());
        let m = registry.get("./modules/imager").await.unwrap();
        assert_eq!(m.process_id, Some(pid));
        assert_eq!(m.channel_key, 9);
        assert!(!m.downgrade_requested);
    }

    #[tokio::test]
    async fn plain_relaunch_ignores_recovery_target() {
        let proc = Arc::new(FakeProc::new(500));
        let registry = Arc::new(ModuleRegistry::new());
        let launcher = Launcher::new(
            Arc::clone(&registry),
            Arc::clone(&proc) as Arc<dyn ProcessControl>,
            Arc::new(FallbackDir),
        );
        registry.insert("./modules/imager", Module::new(Some(42), 9)).await;

        launcher.relaunch("./modules/imager", 0).await.unwrap().unwrap();

        assert_eq!(proc.spawned(), vec![(PathBuf::from("./modules/imager"), 9)]);
    }
}
