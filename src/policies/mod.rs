//! # Supervision policies.
//!
//! Pure decision types, kept separate from the runtime that executes them:
//!
//! - [`RebootPolicy`] / [`RebootDecision`]: classify a module death and
//!   decide between relaunch and downgrade;
//! - [`RecoveryPolicy`] / [`SamePath`]: choose the executable a downgraded
//!   module is relaunched from once recovery is confirmed.

mod reboot;
mod recovery;

pub use reboot::{RebootDecision, RebootPolicy};
pub use recovery::{RecoveryPolicy, SamePath};
