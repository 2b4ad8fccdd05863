//! # Per-module bookkeeping record.
//!
//! [`Module`] is everything the supervisor knows about one managed child
//! process. Records are owned by the [`ModuleRegistry`](super::ModuleRegistry)
//! and always copied out rather than referenced.
//!
//! ## Invariants
//! - `channel_key` never changes for the lifetime of the module; relaunches
//!   reuse the same key.
//! - `early_death_count` is reset on every intentional or ordinary death, and
//!   accumulates only across consecutive suspicious deaths.
//! - `downgrade_requested` is set by the reboot policy and cleared exactly
//!   when the module is next relaunched.
//! - A dead module has `process_id == None` until a relaunch succeeds, with
//!   one exception: a downgraded module keeps its stale pid until recovery
//!   (the stale value is never a live child, and pid lookups treat a miss as
//!   recoverable).

use std::time::{Duration, SystemTime};

use crate::os::Pid;

/// Bookkeeping for one supervised module process.
#[derive(Clone, Debug)]
pub struct Module {
    /// Pid of the running instance, or `None` while dead.
    pub process_id: Option<Pid>,
    /// Fixed key this module uses to reach the messaging layer.
    pub channel_key: i64,
    /// Was the last termination deliberately caused by the supervisor?
    pub killed: bool,
    /// Has this module been told to downgrade and not yet recovered?
    pub downgrade_requested: bool,
    /// Wall-clock time of the most recent launch.
    pub launched_at: SystemTime,
    /// Consecutive deaths classified as suspicious.
    pub early_death_count: u32,
}

impl Module {
    /// Creates a record for a module launched just now.
    ///
    /// `process_id` is `None` when the initial spawn failed; the module is
    /// then registered dead and can still be recovered over the control
    /// topic.
    pub fn new(process_id: Option<Pid>, channel_key: i64) -> Self {
        Self::launched_at(process_id, channel_key, SystemTime::now())
    }

    /// Creates a record with an explicit launch time.
    pub fn launched_at(process_id: Option<Pid>, channel_key: i64, at: SystemTime) -> Self {
        Self {
            process_id,
            channel_key,
            killed: false,
            downgrade_requested: false,
            launched_at: at,
            early_death_count: 0,
        }
    }

    /// Wall-clock duration this instance has been (or had been) running.
    ///
    /// Clock skew that puts the launch in the future reads as zero runtime,
    /// which classifies the death as suspicious rather than panicking.
    pub fn running_duration(&self, now: SystemTime) -> Duration {
        now.duration_since(self.launched_at).unwrap_or_default()
    }
}
