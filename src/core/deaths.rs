//! # Child-death notification channel.
//!
//! The OS reports module terminations asynchronously (SIGCHLD). The watch
//! task spawned here does the absolute minimum in response: reap every
//! terminated child non-blockingly and append the raw pids to an unbounded
//! queue. Matching pids to modules, policy decisions, and relaunches all
//! happen later, on the supervisor loop, via [`DeathQueue::drain`].
//!
//! ```text
//! SIGCHLD ──► watch task ──► reap_nonblocking() ──► mpsc ──► DeathQueue
//!                                                              │ drain()
//!                                                              ▼
//!                                                     supervisor loop tick
//! ```
//!
//! ## Rules
//! - The watch task never touches the registry, never logs per-death, never
//!   blocks: reap and send only.
//! - Reaping loops until empty; one SIGCHLD may stand for several deaths.
//! - Drain is try-semantics: it takes whatever is queued and returns.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;
use crate::os::{Pid, ProcessControl};

/// Consumer end of the pending-death queue.
pub(crate) struct DeathQueue {
    rx: Mutex<UnboundedReceiver<Pid>>,
}

/// Creates the pending-death queue.
///
/// The sender side goes to the watch task (and to tests injecting deaths);
/// the [`DeathQueue`] is drained by the supervisor loop.
pub(crate) fn pending_deaths() -> (UnboundedSender<Pid>, DeathQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, DeathQueue { rx: Mutex::new(rx) })
}

impl DeathQueue {
    /// Removes and returns every queued pid, oldest first. Never waits.
    pub(crate) async fn drain(&self) -> Vec<Pid> {
        let mut rx = self.rx.lock().await;
        let mut pids = Vec::new();
        while let Ok(pid) = rx.try_recv() {
            pids.push(pid);
        }
        pids
    }
}

/// Spawns the SIGCHLD watch task feeding `tx`.
///
/// The task exits when `token` is cancelled. Registration failure is the one
/// startup error the supervisor cannot degrade around, so it is returned
/// rather than logged.
#[cfg(unix)]
pub(crate) fn spawn_child_watch(
    proc: Arc<dyn ProcessControl>,
    tx: UnboundedSender<Pid>,
    token: CancellationToken,
) -> Result<(), RuntimeError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigchld =
        signal(SignalKind::child()).map_err(|source| RuntimeError::SignalSetup { source })?;

    tokio::spawn(async move {
        // Children may have died between registry population and this
        // registration; their SIGCHLD predates the listener, so reap once
        // up front.
        for pid in proc.reap_nonblocking() {
            if tx.send(pid).is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                observed = sigchld.recv() => {
                    if observed.is_none() {
                        break;
                    }
                    for pid in proc.reap_nonblocking() {
                        if tx.send(pid).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    });

    Ok(())
}

/// No SIGCHLD off Unix; module deaths are not observable and the queue stays
/// empty. The supervisor still serves the control topic.
#[cfg(not(unix))]
pub(crate) fn spawn_child_watch(
    _proc: Arc<dyn ProcessControl>,
    _tx: UnboundedSender<Pid>,
    _token: CancellationToken,
) -> Result<(), RuntimeError> {
    Ok(())
}
