//! `pa11y-dashboard` binary.
//!
//! Loads `config/<env>` for the environment named by `DASHBOARD_ENV`
//! (default `development`), overlaid with `DASHBOARD_*` variables, then
//! serves until Ctrl-C or a fatal route failure. Any stop other than Ctrl-C
//! exits with status 1 so a process supervisor restarts the dashboard.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use pa11y_dashboard::{DashboardConfig, init_app};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Directory holding the per-environment config files.
const CONFIG_DIR: &str = "config";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the server
/// cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let env = std::env::var("DASHBOARD_ENV").unwrap_or_else(|_| String::from("development"));
    let config = DashboardConfig::load(Path::new(CONFIG_DIR), &env)
        .with_context(|| format!("loading {CONFIG_DIR}/{env}"))?;

    let app = init_app(&config)
        .await
        .context("starting pa11y-dashboard")?;
    info!(
        address = %app.address(),
        webservice = %app.webservice().base_url(),
        "pa11y-dashboard started"
    );

    let mut route_errors = app.on_route_error();
    tokio::spawn(async move {
        loop {
            match route_errors.recv().await {
                Ok(event) => warn!(
                    kind = ?event.kind,
                    method = %event.method,
                    path = %event.path,
                    "route error reported: {}",
                    event.message
                ),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "route error log fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = app.run().await;
    info!(?outcome, "pa11y-dashboard exiting");
    Ok(ExitCode::from(outcome.exit_code()))
}
