//! # Operating-system seams.
//!
//! Everything the supervisor needs from the OS lives behind this module:
//!
//! - [`proc`]: spawn, reap, and signal module processes ([`ProcessControl`]);
//! - [`scan`]: list module executables in a directory;
//! - [`shutdown`]: cross-platform wait for a termination signal.
//!
//! The [`ProcessControl`] trait is the unit-test seam: production code uses
//! the `nix`-backed [`OsProcessControl`], tests substitute a fake that hands
//! out predictable pids and records signals.

pub(crate) mod scan;
pub(crate) mod shutdown;

mod proc;

#[cfg(unix)]
pub use proc::OsProcessControl;
pub use proc::{Pid, ProcessControl};
pub use scan::modules_in;
