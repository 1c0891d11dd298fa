//! Server-rendered dashboard for pa11y-webservice.
//!
//! The dashboard owns no data. Every page is a fetch from the remote
//! webservice (via [`pa11y_client`]) followed by a template render.
//!
//! - **Application shell** ([`server`]) -- binds the listener, serves each
//!   accepted socket on its own task, and tracks it in a
//!   [`ConnectionManager`]
//! - **Route table** ([`router`]) -- read routes always, mutating routes only
//!   when [`Capabilities::can_mutate`] is set
//! - **Route handlers** ([`routes`]) -- one module per page or action
//! - **View layer** ([`views`], [`presenter`]) -- embedded `minijinja`
//!   templates fed by display-ready view models
//! - **Fault handler** ([`fault`]) -- the single place route failures are
//!   classified, published, rendered, and escalated to the [`Supervisor`]
//!
//! # Failure posture
//!
//! Route failures are fatal to the server by default: after the 500 page is
//! rendered the serve loop stops and [`ServeOutcome::exit_code`] is non-zero,
//! leaving restarts to an external process supervisor. A dropped webservice
//! connection additionally destroys every open socket before the loop
//! returns.
//!
//! [`Capabilities::can_mutate`]: state::Capabilities::can_mutate
//! [`Supervisor`]: supervisor::Supervisor

pub mod config;
pub mod connections;
pub mod error;
pub mod fault;
pub mod presenter;
pub mod router;
pub mod routes;
pub mod server;
pub mod state;
pub mod supervisor;
pub mod views;

// Re-export primary types for convenience.
pub use config::{DashboardConfig, RunMode, WebserviceAddress};
pub use connections::ConnectionManager;
pub use error::DashboardError;
pub use router::build_router;
pub use server::{Dashboard, ServeOutcome, ServerError, init_app};
pub use state::{AppState, Capabilities};
