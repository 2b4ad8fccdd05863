//! # Supervisor: the top-level babysitting loop.
//!
//! The [`Supervisor`] owns the module registry and composes the launcher,
//! the pending-death queue, the rebooter, and the control relay into one
//! continuous cycle.
//!
//! ## High-level architecture
//! ```text
//! run():
//!   ├─ Launcher::launch_all(modules_dir, start_key)   (registry population)
//!   ├─ spawn_child_watch()                            (SIGCHLD → death queue)
//!   └─ select:
//!       ├─ termination signal ──► cancel token, return
//!       ├─ token cancelled    ──► return
//!       └─ babysit loop:
//!            loop {
//!              ├─ drain death queue ──► Rebooter::handle_death(pid) each
//!              ├─ ControlRelay::poll()   (one control message, if any)
//!              └─ sleep(poll_interval)   (cancellable)
//!            }
//! ```
//!
//! ## Rules
//! - The loop has no terminal state of its own; it ends only through an OS
//!   termination signal or the caller's [`CancellationToken`].
//! - All registry mutation happens on this loop (rebooter, then relay,
//!   sequentially); the watch task only appends pids to the queue.
//! - Nothing in the cycle blocks indefinitely; only the end-of-tick sleep
//!   waits, bounded by `poll_interval`.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time;
use tokio_util::sync::CancellationToken;

use tracing::info;

use crate::bus::MessageBus;
use crate::config::Config;
use crate::core::deaths::{self, DeathQueue};
use crate::core::launcher::Launcher;
use crate::core::reboot::Rebooter;
use crate::core::relay::ControlRelay;
use crate::error::RuntimeError;
use crate::modules::ModuleRegistry;
use crate::os::{shutdown, Pid, ProcessControl};
use crate::policies::{RecoveryPolicy, SamePath};

/// Babysits module processes: launch, monitor, reboot, downgrade, relay.
pub struct Supervisor {
    cfg: Config,
    registry: Arc<ModuleRegistry>,
    launcher: Arc<Launcher>,
    rebooter: Rebooter,
    relay: ControlRelay,
    proc: Arc<dyn ProcessControl>,
    death_tx: UnboundedSender<Pid>,
    deaths: DeathQueue,
}

impl Supervisor {
    /// Creates a supervisor with the default recovery policy (relaunch the
    /// same executable on downgrade confirmation).
    pub fn new(cfg: Config, bus: Arc<dyn MessageBus>, proc: Arc<dyn ProcessControl>) -> Self {
        Self::with_recovery(cfg, bus, proc, Arc::new(SamePath))
    }

    /// Creates a supervisor with an explicit [`RecoveryPolicy`].
    pub fn with_recovery(
        cfg: Config,
        bus: Arc<dyn MessageBus>,
        proc: Arc<dyn ProcessControl>,
        recovery: Arc<dyn RecoveryPolicy>,
    ) -> Self {
        let registry = Arc::new(ModuleRegistry::new());
        let launcher = Arc::new(Launcher::new(
            Arc::clone(&registry),
            Arc::clone(&proc),
            recovery,
        ));
        let rebooter = Rebooter::new(
            Arc::clone(&registry),
            Arc::clone(&launcher),
            Arc::clone(&bus),
            cfg.reboot_policy(),
            cfg.downgrade_topic.clone(),
        );
        let relay = ControlRelay::new(
            Arc::clone(&registry),
            Arc::clone(&launcher),
            bus,
            cfg.upgrade_topic.clone(),
        );
        let (death_tx, deaths) = deaths::pending_deaths();

        Self {
            cfg,
            registry,
            launcher,
            rebooter,
            relay,
            proc,
            death_tx,
            deaths,
        }
    }

    /// The authoritative map of managed modules.
    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Populates the registry from `modules_dir` and babysits until either a
    /// termination signal arrives or `token` is cancelled.
    ///
    /// The only propagated error is [`RuntimeError::SignalSetup`]; everything
    /// else the loop encounters degrades to logging plus skipping the
    /// affected module.
    pub async fn run(&self, token: CancellationToken) -> Result<(), RuntimeError> {
        let next_key = self
            .launcher
            .launch_all(&self.cfg.modules_dir, self.cfg.start_key)
            .await;
        info!(
            modules = self.registry.len().await,
            next_key, "registry populated; babysitting"
        );

        deaths::spawn_child_watch(
            Arc::clone(&self.proc),
            self.death_tx.clone(),
            token.child_token(),
        )?;

        tokio::select! {
            res = shutdown::wait_for_termination() => {
                token.cancel();
                let sig = res.map_err(|source| RuntimeError::SignalSetup { source })?;
                info!(signal = sig, "termination signal received; shutting down");
            }
            _ = token.cancelled() => {}
            _ = self.babysit() => {}
        }
        Ok(())
    }

    /// The steady-state cycle; never returns on its own.
    async fn babysit(&self) {
        loop {
            self.tick().await;
            time::sleep(self.cfg.poll_interval()).await;
        }
    }

    /// One babysitting iteration: drain pending deaths through the policy
    /// engine, then poll the control relay once.
    pub(crate) async fn tick(&self) {
        for pid in self.deaths.drain().await {
            self.rebooter.handle_death(pid).await;
        }
        self.relay.poll().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LocalBus;
    use crate::modules::Module;
    use crate::testutil::FakeProc;
    use std::time::{Duration, SystemTime};

    struct Fixture {
        supervisor: Supervisor,
        bus: Arc<LocalBus>,
        proc: Arc<FakeProc>,
    }

    fn fixture() -> Fixture {
        let cfg = Config {
            poll_interval_ms: 10,
            ..Config::default()
        };
        let bus = Arc::new(LocalBus::new());
        let proc = Arc::new(FakeProc::new(3000));
        let supervisor = Supervisor::new(
            cfg,
            Arc::clone(&bus) as Arc<dyn MessageBus>,
            Arc::clone(&proc) as Arc<dyn ProcessControl>,
        );
        Fixture {
            supervisor,
            bus,
            proc,
        }
    }

    fn seasoned_module(pid: i32, key: i64) -> Module {
        Module::launched_at(
            Some(pid),
            key,
            SystemTime::now() - Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn tick_drains_deaths_in_order_then_polls_relay() {
        let fx = fixture();
        let registry = fx.supervisor.registry();
        registry.insert("a", seasoned_module(111, 1)).await;
        registry.insert("b", seasoned_module(222, 2)).await;

        fx.supervisor.death_tx.send(111).unwrap();
        fx.supervisor.death_tx.send(222).unwrap();
        fx.bus.publish("module_upgrade", "b").await;

        fx.supervisor.tick().await;

        // both deaths rebooted
        let a = registry.get("a").await.unwrap();
        let b = registry.get("b").await.unwrap();
        assert_ne!(a.process_id, Some(111));
        assert_ne!(b.process_id, Some(222));
        // and the relay saw the kill command afterwards
        assert!(b.killed);
        assert_eq!(fx.proc.terminated().len(), 1);
    }

    #[tokio::test]
    async fn tick_with_nothing_pending_is_a_noop() {
        let fx = fixture();
        fx.supervisor
            .registry()
            .insert("a", seasoned_module(111, 1))
            .await;

        fx.supervisor.tick().await;

        let a = fx.supervisor.registry().get("a").await.unwrap();
        assert_eq!(a.process_id, Some(111));
        assert!(fx.proc.spawned().is_empty());
    }

    #[tokio::test]
    async fn full_cycle_kill_then_death_reboots_clean() {
        let fx = fixture();
        let registry = fx.supervisor.registry();
        registry.insert("a", seasoned_module(111, 1)).await;

        // external kill command arrives
        fx.bus.publish("module_upgrade", "a").await;
        fx.supervisor.tick().await;
        assert!(registry.get("a").await.unwrap().killed);

        // the resulting death is reported and classified intentional
        fx.supervisor.death_tx.send(111).unwrap();
        fx.supervisor.tick().await;

        let a = registry.get("a").await.unwrap();
        assert!(!a.killed);
        assert!(!a.downgrade_requested);
        assert_eq!(a.early_death_count, 0);
        assert_ne!(a.process_id, Some(111));
        assert!(a.process_id.is_some());
    }

    #[tokio::test]
    async fn run_populates_registry_and_honors_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha"), b"").unwrap();
        std::fs::write(dir.path().join("beta"), b"").unwrap();

        let cfg = Config {
            modules_dir: dir.path().to_path_buf(),
            start_key: 42,
            poll_interval_ms: 5,
            ..Config::default()
        };
        let bus = Arc::new(LocalBus::new());
        let proc = Arc::new(FakeProc::new(4000));
        let supervisor = Supervisor::new(cfg, bus, proc);

        let token = CancellationToken::new();
        let stop = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            stop.cancel();
        });

        supervisor.run(token).await.unwrap();
        assert_eq!(supervisor.registry().len().await, 2);
    }
}
