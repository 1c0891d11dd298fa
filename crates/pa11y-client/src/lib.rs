//! Client for the pa11y-webservice HTTP API.
//!
//! The webservice owns every task and result; this crate is the dashboard's
//! only way to reach it. Calls are grouped by resource the same way the
//! service's URLs are:
//!
//! ```rust,ignore
//! use pa11y_client::{TaskQuery, WebserviceClient};
//!
//! let client = WebserviceClient::new("http://localhost:3000/")?;
//! let tasks = client.tasks().get(&TaskQuery::with_last_result()).await?;
//! let task = client.task(&tasks[0].id).get(&TaskQuery::default()).await?;
//! ```
//!
//! Transport failures are classified into a [`TransportCode`] so callers can
//! react to an unreachable service or a dropped connection without parsing
//! error strings.

pub mod client;
pub mod error;
pub mod query;

pub use client::{ResultEndpoint, TaskEndpoint, TasksEndpoint, WebserviceClient};
pub use error::{ClientError, TransportCode};
pub use query::{ResultQuery, TaskQuery};
