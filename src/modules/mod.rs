//! # Managed modules: bookkeeping record and registry.
//!
//! A *module* is one supervised child process plus the state the supervisor
//! keeps about it: current pid, messaging channel key, death history, and the
//! flags driving the reboot/downgrade policy.
//!
//! ## Contents
//! - [`Module`] — per-module bookkeeping record
//! - [`ModuleRegistry`] — the authoritative path → [`Module`] map
//!
//! All mutation flows through the registry; no long-lived references to
//! individual records exist anywhere. Callers re-fetch by path instead.

mod module;
mod registry;

pub use module::Module;
pub use registry::ModuleRegistry;
