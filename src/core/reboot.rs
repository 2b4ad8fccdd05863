//! # Rebooter: applies the reboot policy to dead modules.
//!
//! One [`Rebooter::handle_death`] call per pid drained from the pending-death
//! queue:
//!
//! ```text
//! pid ──► find_by_pid ──► none? warn + skip (foreign child or stale entry)
//!          │
//!          ▼
//!        RebootPolicy::decide
//!          ├─ Relaunch  ──► Launcher::relaunch (same key, flags cleared)
//!          └─ Downgrade ──► flag entry, publish path on downgrade topic,
//!                           leave dead until external confirmation
//! ```
//!
//! ## Rules
//! - An unresolved pid is recoverable: warn and continue.
//! - A downgraded module keeps its stale pid (it is not relaunched) and its
//!   count resets, matching the relaunch-side reset on recovery.
//! - A failed relaunch is the only escalation here: error-level log, entry
//!   left dead, supervisor keeps running.

use std::sync::Arc;
use std::time::SystemTime;

use tracing::{error, info, warn};

use crate::bus::MessageBus;
use crate::core::launcher::Launcher;
use crate::modules::ModuleRegistry;
use crate::os::Pid;
use crate::policies::{RebootDecision, RebootPolicy};

/// Drains dead pids through the reboot policy and executes the outcome.
pub(crate) struct Rebooter {
    registry: Arc<ModuleRegistry>,
    launcher: Arc<Launcher>,
    bus: Arc<dyn MessageBus>,
    policy: RebootPolicy,
    downgrade_topic: String,
}

impl Rebooter {
    pub(crate) fn new(
        registry: Arc<ModuleRegistry>,
        launcher: Arc<Launcher>,
        bus: Arc<dyn MessageBus>,
        policy: RebootPolicy,
        downgrade_topic: String,
    ) -> Self {
        Self {
            registry,
            launcher,
            bus,
            policy,
            downgrade_topic,
        }
    }

    /// Resolves a dead pid to its module and reboots or downgrades it.
    pub(crate) async fn handle_death(&self, pid: Pid) {
        let Some(path) = self.registry.find_by_pid(pid).await else {
            warn!(pid, "unregistered module death");
            return;
        };
        self.reboot(&path).await;
    }

    /// Applies the reboot policy to the module registered at `path`.
    pub(crate) async fn reboot(&self, path: &str) {
        let Some(module) = self.registry.get(path).await else {
            warn!(module = %path, "reboot requested for unknown module");
            return;
        };

        match self.policy.decide(&module, SystemTime::now()) {
            RebootDecision::Relaunch { early_deaths } => {
                match self.launcher.relaunch(path, early_deaths).await {
                    Some(Ok(pid)) => {
                        info!(module = %path, pid, early_deaths, "module rebooted");
                    }
                    Some(Err(e)) => {
                        error!(module = %path, error = %e, "relaunch failed; module left dead");
                    }
                    None => {
                        warn!(module = %path, "module disappeared from registry during reboot");
                    }
                }
            }
            RebootDecision::Downgrade => {
                self.registry
                    .update_with(path, |m| {
                        m.downgrade_requested = true;
                        m.early_death_count = 0;
                    })
                    .await;
                self.bus.publish(&self.downgrade_topic, path).await;
                warn!(module = %path, "too many early deaths; downgrade requested");
            }
        }
    }
}
