//! # Control relay: upgrade/downgrade commands from the platform.
//!
//! Each supervisor tick polls the upgrade topic once. A message is a module
//! path, and its meaning depends on the module's state:
//!
//! - `downgrade_requested` set → the external authority is confirming the
//!   downgrade: relaunch the module at its recovery target with a clean
//!   death history.
//! - otherwise → kill command: mark the module intentionally killed and send
//!   SIGTERM. The death comes back through the pending-death queue and the
//!   policy engine reboots it clean.
//!
//! ## Rules
//! - Exactly one message is consumed per tick; the poll never waits.
//! - A path that is not registered is a warning and a no-op, never a crash.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::bus::MessageBus;
use crate::core::launcher::{KillOutcome, Launcher};
use crate::modules::ModuleRegistry;

/// Polls the upgrade topic and applies kill/recover commands.
pub(crate) struct ControlRelay {
    registry: Arc<ModuleRegistry>,
    launcher: Arc<Launcher>,
    bus: Arc<dyn MessageBus>,
    upgrade_topic: String,
}

impl ControlRelay {
    pub(crate) fn new(
        registry: Arc<ModuleRegistry>,
        launcher: Arc<Launcher>,
        bus: Arc<dyn MessageBus>,
        upgrade_topic: String,
    ) -> Self {
        Self {
            registry,
            launcher,
            bus,
            upgrade_topic,
        }
    }

    /// Consumes at most one pending control message and applies it.
    pub(crate) async fn poll(&self) {
        let Some(path) = self.bus.try_receive(&self.upgrade_topic).await else {
            return;
        };

        let Some(module) = self.registry.get(&path).await else {
            warn!(module = %path, "control message for unknown module");
            return;
        };

        if module.downgrade_requested {
            match self.launcher.relaunch(&path, 0).await {
                Some(Ok(pid)) => {
                    info!(module = %path, pid, "downgrade confirmed; module recovered");
                }
                Some(Err(e)) => {
                    error!(module = %path, error = %e, "recovery relaunch failed; module left dead");
                }
                None => {
                    warn!(module = %path, "module disappeared from registry during recovery");
                }
            }
        } else {
            match self.launcher.kill(&path).await {
                Some(Ok(KillOutcome::Signaled(pid))) => {
                    info!(module = %path, pid, "kill command delivered");
                }
                Some(Ok(KillOutcome::AlreadyDead)) => {
                    warn!(module = %path, "kill command for module with no live process; ignored");
                }
                Some(Err(e)) => {
                    warn!(module = %path, error = %e, "kill command could not be delivered");
                }
                None => warn!(module = %path, "module disappeared from registry during kill"),
            }
        }
    }
}
