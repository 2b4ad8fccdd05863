//! Runtime core: module lifecycle supervision.
//!
//! This module contains the embedded implementation of the modvisor runtime.
//! The only public API from this module is [`Supervisor`], which populates
//! the registry, babysits module processes, and handles graceful shutdown.
//!
//! Internal modules:
//! - [`launcher`]: spawns modules and applies relaunch/kill mutations to the registry;
//! - [`deaths`]: SIGCHLD watch task and the pending-death queue it feeds;
//! - [`reboot`]: drains dead pids through the reboot policy;
//! - [`relay`]: polls the upgrade topic and applies kill/recover commands;
//! - [`supervisor`]: the top-level babysitting loop.

mod deaths;
mod launcher;
mod reboot;
mod relay;
mod supervisor;

pub use supervisor::Supervisor;
