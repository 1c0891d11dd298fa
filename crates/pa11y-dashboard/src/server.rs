//! Dashboard server lifecycle.
//!
//! [`init_app`] builds the state and router and binds the listener;
//! [`Dashboard::run_until`] then serves until a signal arrives or the fault
//! handler files a shutdown request with the
//! [`Supervisor`](crate::supervisor::Supervisor).
//!
//! Each accepted socket is served on its own task by `hyper_util`'s
//! auto-detecting HTTP/1 + HTTP/2 builder and registered in the
//! [`ConnectionManager`] for as long as it is open. When the loop stops it
//! closes the listener first, so no new work arrives while the remaining
//! connections are drained or destroyed.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use pa11y_client::{ClientError, WebserviceClient};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::connections::ConnectionManager;
use crate::fault::RouteErrorEvent;
use crate::router::build_router;
use crate::state::AppState;
use crate::supervisor::ShutdownRequest;

/// Errors that can occur when starting the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The webservice address is unusable.
    #[error(transparent)]
    Webservice(#[from] ClientError),

    /// The templates failed to load.
    #[error("view setup error: {0}")]
    Views(String),
}

/// How a serve loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeOutcome {
    /// A shutdown signal arrived.
    Stopped,
    /// A route failure stopped the server; open connections were drained.
    Restart {
        /// Message of the failure.
        reason: String,
    },
    /// The webservice hung up; every open connection was destroyed.
    Teardown {
        /// Message of the failure.
        reason: String,
        /// Connections that were still open and got destroyed.
        destroyed: usize,
    },
}

impl ServeOutcome {
    /// Process exit code: zero only for a requested stop.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Stopped => 0,
            Self::Restart { .. } | Self::Teardown { .. } => 1,
        }
    }
}

/// A bound, not yet serving, dashboard.
#[derive(Debug)]
pub struct Dashboard {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
    router: Router,
    connections: Arc<ConnectionManager>,
    shutdown_grace: Duration,
}

/// Build the dashboard for `config` and bind its listener.
pub async fn init_app(config: &DashboardConfig) -> Result<Dashboard, ServerError> {
    let state = Arc::new(AppState::new(config)?);
    let router = build_router(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| ServerError::Bind(format!("no local address for {addr}: {e}")))?;

    info!(
        %local_addr,
        readonly = !state.capabilities.can_mutate,
        production = state.production(),
        "dashboard listening"
    );

    Ok(Dashboard {
        listener,
        local_addr,
        state,
        router,
        connections: Arc::new(ConnectionManager::new()),
        shutdown_grace: Duration::from_millis(config.shutdown_grace_ms),
    })
}

impl Dashboard {
    /// The URL the dashboard answers on, e.g. `http://0.0.0.0:4000`.
    pub fn address(&self) -> String {
        format!("http://{}", self.local_addr)
    }

    /// The bound socket address.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The webservice client the routes use.
    pub fn webservice(&self) -> &WebserviceClient {
        &self.state.webservice
    }

    /// The open-connection registry.
    pub fn connections(&self) -> Arc<ConnectionManager> {
        Arc::clone(&self.connections)
    }

    /// The shared application state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Receive every route error from now on.
    pub fn on_route_error(&self) -> broadcast::Receiver<RouteErrorEvent> {
        self.state.subscribe_route_errors()
    }

    /// Serve until Ctrl-C or a fatal route failure.
    pub async fn run(self) -> ServeOutcome {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C, serving until a fault");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve until `signal` completes or a fatal route failure.
    pub async fn run_until(self, signal: impl Future<Output = ()> + Send) -> ServeOutcome {
        let Self {
            listener,
            state,
            router,
            connections,
            shutdown_grace,
            ..
        } = self;
        let mut shutdown = state.supervisor.subscribe();
        tokio::pin!(signal);

        let request = loop {
            let pending = shutdown.borrow_and_update().clone();
            if pending.is_some() {
                break pending;
            }
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => spawn_connection(&router, &connections, stream, peer),
                    Err(e) => warn!(error = %e, "failed to accept connection"),
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break None;
                    }
                }
                () = &mut signal => break None,
            }
        };

        drop(listener);
        info!("listener closed");

        match request {
            Some(ShutdownRequest::Teardown { reason }) => {
                let destroyed = connections.destroy_all();
                warn!(%reason, destroyed, "server torn down");
                ServeOutcome::Teardown { reason, destroyed }
            }
            Some(ShutdownRequest::Restart { reason }) => {
                drain(&connections, shutdown_grace).await;
                warn!(%reason, "server stopped after route failure");
                ServeOutcome::Restart { reason }
            }
            None => {
                drain(&connections, shutdown_grace).await;
                info!("server stopped");
                ServeOutcome::Stopped
            }
        }
    }
}

/// Give open connections `grace` to finish, then destroy the rest.
async fn drain(connections: &ConnectionManager, grace: Duration) {
    if !connections.wait_until_empty(grace).await {
        let destroyed = connections.destroy_all();
        debug!(destroyed, "destroyed connections still open after grace period");
    }
}

/// Serve one socket on its own task until it closes or is destroyed.
fn spawn_connection(
    router: &Router,
    connections: &Arc<ConnectionManager>,
    stream: TcpStream,
    peer: SocketAddr,
) {
    let token = CancellationToken::new();
    let id = connections.register(Some(peer), token.clone());
    let connections = Arc::clone(connections);
    let service = TowerToHyperService::new(router.clone());

    tokio::spawn(async move {
        let builder = auto::Builder::new(TokioExecutor::new());
        let connection = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
        tokio::select! {
            result = connection => {
                if let Err(e) = result {
                    debug!(connection = %id, error = %e, "connection ended with error");
                }
            }
            () = token.cancelled() => {}
        }
        connections.unregister(id);
    });
}
