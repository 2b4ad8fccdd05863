//! Thin daemon entry point: load config, wire the OS and messaging seams,
//! babysit until a termination signal.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use modvisor::{Config, LocalBus, OsProcessControl, Supervisor, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let cfg = match Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(path = %config_path, error = %e, "unable to load config");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(path = %config_path, modules_dir = %cfg.modules_dir.display(), "starting supervisor");

    let supervisor = Supervisor::new(cfg, Arc::new(LocalBus::new()), Arc::new(OsProcessControl::new()));
    match supervisor.run(CancellationToken::new()).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "supervisor stopped");
            std::process::ExitCode::FAILURE
        }
    }
}
