//! # Global supervisor configuration.
//!
//! Provides [`Config`], the centralized settings for the supervision runtime.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::new(config, bus, proc)`
//! 2. **Daemon startup**: `Config::load(path)` reads a JSON file
//!
//! ## Field semantics
//! - `modules_dir`: directory scanned for module executables at startup
//! - `start_key`: first messaging channel key; each module gets the next one
//! - `suspicious_death_secs`: deaths after less runtime than this are suspicious
//! - `death_count_threshold`: consecutive suspicious deaths strictly above
//!   this trigger a downgrade
//! - `upgrade_topic` / `downgrade_topic`: control topics on the message bus
//! - `poll_interval_ms`: bounded yield between supervisor loop iterations
//!
//! Raw durations are stored as integers so the struct maps 1:1 onto the JSON
//! config file; prefer the accessor helpers ([`Config::suspicious_duration`],
//! [`Config::poll_interval`]) over converting at call sites.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policies::RebootPolicy;

/// Default location the daemon reads its configuration from.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/modvisor/config.json";

/// Global configuration for the supervision runtime.
///
/// Every field has a default, so a config file only needs to name the fields
/// it overrides.
///
/// # Example
/// ```
/// use modvisor::Config;
///
/// let cfg = Config::default();
/// assert_eq!(cfg.death_count_threshold, 5);
/// assert_eq!(cfg.suspicious_duration().as_secs(), 10);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory containing module executables to launch at startup.
    pub modules_dir: PathBuf,

    /// First channel key handed out during initial population.
    ///
    /// Keys are assigned consecutively in scan order and stay fixed for the
    /// lifetime of each module, across relaunches.
    pub start_key: i64,

    /// Minimum runtime, in seconds, for a death to count as ordinary.
    ///
    /// A module that dies before running this long (and was not killed by the
    /// supervisor) is counted as a suspicious death.
    pub suspicious_death_secs: u64,

    /// Number of consecutive suspicious deaths a module may accumulate.
    ///
    /// The comparison is strict: a module is downgraded only when its count
    /// *exceeds* this value.
    pub death_count_threshold: u32,

    /// Topic the supervisor polls for upgrade/kill commands.
    pub upgrade_topic: String,

    /// Topic the supervisor publishes downgrade requests on.
    pub downgrade_topic: String,

    /// Bounded yield between supervisor loop iterations, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `modules_dir = ./modules`
    /// - `start_key = 1000`
    /// - `suspicious_death_secs = 10`
    /// - `death_count_threshold = 5`
    /// - `upgrade_topic = module_upgrade`
    /// - `downgrade_topic = module_downgrade`
    /// - `poll_interval_ms = 250`
    fn default() -> Self {
        Self {
            modules_dir: PathBuf::from("./modules"),
            start_key: 1000,
            suspicious_death_secs: 10,
            death_count_threshold: 5,
            upgrade_topic: "module_upgrade".to_string(),
            downgrade_topic: "module_downgrade".to_string(),
            poll_interval_ms: 250,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults. Read and parse failures are
    /// reported separately so the daemon can log which one happened.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Minimum runtime below which a death is classified suspicious.
    pub fn suspicious_duration(&self) -> Duration {
        Duration::from_secs(self.suspicious_death_secs)
    }

    /// Yield between supervisor loop iterations.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Builds the reboot policy these settings describe.
    pub fn reboot_policy(&self) -> RebootPolicy {
        RebootPolicy {
            suspicious_duration: self.suspicious_duration(),
            death_count_threshold: self.death_count_threshold,
        }
    }
}
