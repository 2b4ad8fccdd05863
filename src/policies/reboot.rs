//! # Reboot policy: relaunch or downgrade a dead module.
//!
//! A death is **ordinary** when the supervisor killed the module itself, or
//! when the instance had been running at least
//! [`RebootPolicy::suspicious_duration`] — crashes after a healthy stretch of
//! runtime are routine and the module is simply relaunched with its history
//! cleared.
//!
//! A death is **suspicious** when neither holds: the module came up and died
//! again within the cutoff. Suspicious deaths accumulate across relaunches;
//! once the count *exceeds* [`RebootPolicy::death_count_threshold`] the
//! module is not relaunched but flagged for downgrade, and stays dead until
//! an external authority confirms recovery over the control topic.
//!
//! ```text
//! death of <module>
//!   ├─ killed or ran >= cutoff ──► Relaunch { early_deaths: 0 }
//!   └─ suspicious
//!        ├─ count+1 >  threshold ──► Downgrade        (strict >)
//!        └─ count+1 <= threshold ──► Relaunch { early_deaths: count+1 }
//! ```

use std::time::{Duration, SystemTime};

use crate::modules::Module;

/// Thresholds for classifying deaths and triggering downgrades.
///
/// # Example
/// ```
/// use std::time::{Duration, SystemTime};
/// use modvisor::{Module, RebootDecision, RebootPolicy};
///
/// let policy = RebootPolicy { suspicious_duration: Duration::from_secs(10), death_count_threshold: 5 };
///
/// // Launched an hour ago: the death is ordinary.
/// let seasoned = Module::launched_at(Some(100), 1, SystemTime::now() - Duration::from_secs(3600));
/// assert_eq!(policy.decide(&seasoned, SystemTime::now()), RebootDecision::Relaunch { early_deaths: 0 });
///
/// // Launched just now: the death is suspicious, first strike.
/// let fresh = Module::launched_at(Some(101), 2, SystemTime::now());
/// assert_eq!(policy.decide(&fresh, SystemTime::now()), RebootDecision::Relaunch { early_deaths: 1 });
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RebootPolicy {
    /// Minimum runtime for a death to count as ordinary.
    pub suspicious_duration: Duration,
    /// Consecutive suspicious deaths a module may accumulate before being
    /// downgraded. Strict comparison: downgrade fires when the count
    /// *exceeds* this value.
    pub death_count_threshold: u32,
}

impl Default for RebootPolicy {
    /// 10 seconds minimum runtime, 5 tolerated suspicious deaths.
    fn default() -> Self {
        Self {
            suspicious_duration: Duration::from_secs(10),
            death_count_threshold: 5,
        }
    }
}

/// What to do with a module that just died.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebootDecision {
    /// Relaunch the module; store `early_deaths` as its new suspicious-death
    /// count (0 after an ordinary death, the incremented count after a
    /// tolerated suspicious one).
    Relaunch {
        /// Suspicious-death count to carry into the new instance.
        early_deaths: u32,
    },
    /// Do not relaunch: flag the module for downgrade, publish the request,
    /// and leave it dead pending external confirmation.
    Downgrade,
}

impl RebootPolicy {
    /// True when this death counts as suspicious (early, not supervisor-made).
    pub fn is_suspicious(&self, module: &Module, now: SystemTime) -> bool {
        !module.killed && module.running_duration(now) < self.suspicious_duration
    }

    /// Decides the fate of `module` after its death, per the rules above.
    pub fn decide(&self, module: &Module, now: SystemTime) -> RebootDecision {
        if !self.is_suspicious(module, now) {
            return RebootDecision::Relaunch { early_deaths: 0 };
        }

        let deaths = module.early_death_count.saturating_add(1);
        if deaths > self.death_count_threshold {
            RebootDecision::Downgrade
        } else {
            RebootDecision::Relaunch {
                early_deaths: deaths,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RebootPolicy {
        RebootPolicy {
            suspicious_duration: Duration::from_secs(10),
            death_count_threshold: 5,
        }
    }

    fn module_running_for(secs: u64) -> Module {
        Module::launched_at(Some(100), 1, SystemTime::now() - Duration::from_secs(secs))
    }

    #[test]
    fn long_runtime_death_is_ordinary() {
        let m = module_running_for(60);
        assert!(!policy().is_suspicious(&m, SystemTime::now()));
        assert_eq!(
            policy().decide(&m, SystemTime::now()),
            RebootDecision::Relaunch { early_deaths: 0 }
        );
    }

    #[test]
    fn killed_module_death_is_ordinary_even_when_early() {
        let mut m = module_running_for(0);
        m.killed = true;
        m.early_death_count = 4;
        assert_eq!(
            policy().decide(&m, SystemTime::now()),
            RebootDecision::Relaunch { early_deaths: 0 }
        );
    }

    #[test]
    fn ordinary_death_resets_accumulated_count() {
        let mut m = module_running_for(60);
        m.early_death_count = 4;
        assert_eq!(
            policy().decide(&m, SystemTime::now()),
            RebootDecision::Relaunch { early_deaths: 0 }
        );
    }

    #[test]
    fn suspicious_deaths_accumulate() {
        let mut m = module_running_for(0);
        m.early_death_count = 2;
        assert_eq!(
            policy().decide(&m, SystemTime::now()),
            RebootDecision::Relaunch { early_deaths: 3 }
        );
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        // reaching exactly the threshold does not downgrade...
        let mut m = module_running_for(0);
        m.early_death_count = 4; // +1 == 5 == threshold
        assert_eq!(
            policy().decide(&m, SystemTime::now()),
            RebootDecision::Relaunch { early_deaths: 5 }
        );

        // ...going past it does
        m.early_death_count = 5; // +1 == 6 > 5
        assert_eq!(policy().decide(&m, SystemTime::now()), RebootDecision::Downgrade);
    }

    #[test]
    fn count_saturates_instead_of_overflowing() {
        let mut m = module_running_for(0);
        m.early_death_count = u32::MAX;
        assert_eq!(policy().decide(&m, SystemTime::now()), RebootDecision::Downgrade);
    }
}
