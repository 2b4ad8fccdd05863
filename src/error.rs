//! Error types used by the modvisor runtime.
//!
//! This module defines three error enums:
//!
//! - [`ProcessError`] — failures at the OS process boundary (spawn, signal).
//! - [`ConfigError`] — failures while loading the supervisor configuration.
//! - [`RuntimeError`] — failures in the supervision runtime itself.
//!
//! All types provide `as_label()` returning a short stable snake_case tag for
//! logs and metrics.
//!
//! None of these errors is fatal to the supervisor: spawn and signal failures
//! degrade to a logged skip at the call site, and only the daemon entry point
//! turns a [`ConfigError`] into a non-zero exit.

use std::io;
use thiserror::Error;

/// Errors raised at the OS process boundary.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Spawning a module executable failed (fork/exec error or unusable path).
    ///
    /// The caller must not register a process id for the module; the registry
    /// entry stays dead until a later relaunch succeeds.
    #[error("failed to spawn {path}: {reason}")]
    Spawn {
        /// Path of the module executable.
        path: String,
        /// Underlying OS error text.
        reason: String,
    },

    /// Delivering a termination signal to a module process failed.
    #[error("failed to signal pid {pid}: {reason}")]
    Signal {
        /// Target process id.
        pid: i32,
        /// Underlying OS error text.
        reason: String,
    },
}

impl ProcessError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modvisor::ProcessError;
    ///
    /// let err = ProcessError::Spawn { path: "./modules/x".into(), reason: "ENOENT".into() };
    /// assert_eq!(err.as_label(), "process_spawn_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ProcessError::Spawn { .. } => "process_spawn_failed",
            ProcessError::Signal { .. } => "process_signal_failed",
        }
    }
}

/// Errors raised while loading the supervisor configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("unable to read config at {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON (or has wrong field types).
    #[error("unable to parse config at {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read_failed",
            ConfigError::Parse { .. } => "config_parse_failed",
        }
    }
}

/// Errors raised by the supervision runtime itself.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Registering an OS signal listener failed.
    ///
    /// Without the child-death listener the supervisor cannot observe module
    /// terminations, so this is the one startup error [`Supervisor::run`]
    /// propagates instead of degrading.
    ///
    /// [`Supervisor::run`]: crate::Supervisor::run
    #[error("unable to register signal listener: {source}")]
    SignalSetup {
        /// Underlying I/O error from the signal registration.
        #[source]
        source: io::Error,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::SignalSetup { .. } => "runtime_signal_setup_failed",
        }
    }
}
