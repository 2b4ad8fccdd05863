//! # modvisor
//!
//! **Modvisor** is a process supervisor for satellite flight-computer
//! modules: it launches every module executable found in a directory,
//! monitors their liveness, and automatically reboots or downgrades them
//! according to a death-history policy, while relaying upgrade/downgrade
//! commands over the platform messaging layer.
//!
//! The supervisor itself must never go down: every recognized failure mode
//! (unregistered pid, failed spawn, unreadable directory, malformed control
//! message) degrades to a logged skip, preserving the rest of the system.
//!
//! ## Architecture
//! ```text
//!           ┌──────────────────────────────────────────────────────────┐
//!           │  Supervisor (babysitting loop)                           │
//!           │  - ModuleRegistry (path → Module, single-writer)         │
//!           │  - Launcher (spawn + registry mutation)                  │
//!           │  - Rebooter (reboot policy execution)                    │
//!           │  - ControlRelay (upgrade topic polling)                  │
//!           └───────┬───────────────────┬──────────────────┬───────────┘
//!                   │ spawn/terminate   │ drain            │ publish / try_receive
//!                   ▼                   │                  ▼
//!           ProcessControl (trait)      │           MessageBus (trait)
//!             fork/exec, SIGTERM        │             upgrade/downgrade topics
//!                                       │
//!    SIGCHLD ──► watch task ──► pending-death queue (mpsc)
//!                (reap only)
//! ```
//!
//! ### Lifecycle of a death
//! ```text
//! child dies ──► SIGCHLD ──► reap_nonblocking() ──► queue ──► next tick:
//!   ├─ killed by supervisor, or ran >= cutoff
//!   │      ──► relaunch, same channel key, history cleared
//!   ├─ early death, count within threshold
//!   │      ──► relaunch, count accumulates
//!   └─ early death, count exceeds threshold (strict >)
//!          ──► downgrade_requested, path published on downgrade topic,
//!              stays dead until confirmed over the upgrade topic
//! ```
//!
//! ## Features
//! | Area           | Description                                              | Key types / traits                    |
//! |----------------|----------------------------------------------------------|---------------------------------------|
//! | **Supervision**| Launch, babysit, and reboot module processes.            | [`Supervisor`]                         |
//! | **Policies**   | Death classification and downgrade-target selection.     | [`RebootPolicy`], [`RecoveryPolicy`]   |
//! | **Registry**   | Authoritative per-module bookkeeping.                    | [`Module`], [`ModuleRegistry`]         |
//! | **OS seam**    | Spawn/reap/signal behind a trait; `nix` implementation.  | [`ProcessControl`], [`OsProcessControl`] |
//! | **Messaging**  | Opaque publish/try_receive topics.                       | [`MessageBus`], [`LocalBus`]           |
//! | **Errors**     | Typed, non-fatal by design.                              | [`ProcessError`], [`ConfigError`], [`RuntimeError`] |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use modvisor::{Config, LocalBus, OsProcessControl, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.modules_dir = "./modules".into();
//!
//!     let sup = Supervisor::new(cfg, Arc::new(LocalBus::new()), Arc::new(OsProcessControl::new()));
//!     sup.run(CancellationToken::new()).await?;
//!     Ok(())
//! }
//! ```

mod bus;
mod config;
mod core;
mod error;
mod modules;
mod os;
mod policies;

#[cfg(test)]
pub(crate) mod testutil;

// ---- Public re-exports ----

pub use bus::{LocalBus, MessageBus};
pub use config::{Config, DEFAULT_CONFIG_PATH};
pub use core::Supervisor;
pub use error::{ConfigError, ProcessError, RuntimeError};
pub use modules::{Module, ModuleRegistry};
pub use os::{modules_in, Pid, ProcessControl};
pub use policies::{RebootDecision, RebootPolicy, RecoveryPolicy, SamePath};

#[cfg(unix)]
pub use os::OsProcessControl;
