//! Shared application state for the dashboard.
//!
//! [`AppState`] is built once from a [`DashboardConfig`] and injected into
//! every handler via Axum's `State` extractor. It carries the webservice
//! client, the template environment, the route capabilities, and the two
//! channels the fault handler reports through: the route-error broadcast and
//! the [`Supervisor`].

use std::path::PathBuf;
use std::sync::Arc;

use pa11y_client::WebserviceClient;
use tokio::sync::broadcast;

use crate::config::{DashboardConfig, RunMode};
use crate::fault::{FaultPolicy, RouteErrorEvent};
use crate::server::ServerError;
use crate::supervisor::Supervisor;
use crate::views::{SiteLocals, Views};

/// Capacity of the route-error broadcast channel.
///
/// A subscriber that falls behind by more than this many events receives
/// [`broadcast::error::RecvError::Lagged`] and skips ahead.
const ROUTE_ERROR_CAPACITY: usize = 64;

/// What the route table is allowed to expose, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Register create, edit, delete, run, and ignore routes.
    pub can_mutate: bool,
}

impl Capabilities {
    /// Read-only configurations cannot mutate.
    pub const fn from_config(config: &DashboardConfig) -> Self {
        Self {
            can_mutate: !config.readonly,
        }
    }
}

/// Shared state for the Axum application.
#[derive(Debug)]
pub struct AppState {
    /// Client for the remote webservice.
    pub webservice: WebserviceClient,
    /// Template environment and site locals.
    pub views: Views,
    /// Route set selection.
    pub capabilities: Capabilities,
    /// How route failures escalate.
    pub policy: FaultPolicy,
    /// Deployment mode.
    pub mode: RunMode,
    /// Directory served under `/assets`.
    pub public_dir: PathBuf,
    /// Receives shutdown requests from the fault handler.
    pub supervisor: Arc<Supervisor>,
    route_errors: broadcast::Sender<RouteErrorEvent>,
}

impl AppState {
    /// Build the state for `config`.
    pub fn new(config: &DashboardConfig) -> Result<Self, ServerError> {
        let webservice = WebserviceClient::new(&config.webservice.to_url())?;
        let views = Views::new(SiteLocals::from_config(config))
            .map_err(|e| ServerError::Views(e.to_string()))?;
        let (route_errors, _) = broadcast::channel(ROUTE_ERROR_CAPACITY);

        Ok(Self {
            webservice,
            views,
            capabilities: Capabilities::from_config(config),
            policy: FaultPolicy {
                fail_fast: config.fail_fast,
            },
            mode: config.env,
            public_dir: config.public_dir.clone(),
            supervisor: Arc::new(Supervisor::new()),
            route_errors,
        })
    }

    /// Whether the dashboard runs in production mode.
    pub const fn production(&self) -> bool {
        self.mode.is_production()
    }

    /// Receive every route error from now on.
    pub fn subscribe_route_errors(&self) -> broadcast::Receiver<RouteErrorEvent> {
        self.route_errors.subscribe()
    }

    /// Publish a route error. Returns the number of subscribers reached.
    pub fn publish_route_error(&self, event: &RouteErrorEvent) -> usize {
        // send only fails when nobody is listening
        self.route_errors.send(event.clone()).unwrap_or(0)
    }
}
