//! Route handlers.
//!
//! Each handler fetches what it needs from the webservice and renders one
//! view. Failures are returned as [`DashboardError`] and rendered by the
//! fault middleware, never here.
//!
//! # Endpoints
//!
//! | Method | Path | Module |
//! |--------|------|--------|
//! | `GET` | `/` | [`index`] |
//! | `GET` | `/client/:client` | [`index`] |
//! | `GET` | `/:id` | [`task`] |
//! | `GET` | `/:id/:rid`, `.csv`, `.json` | [`result`], [`download`] |
//! | `GET`, `POST` | `/new` | [`new`] |
//! | `GET`, `POST` | `/:id/edit` | [`edit`] |
//! | `GET`, `POST` | `/:id/delete` | [`delete`] |
//! | `GET` | `/:id/run` | [`run`] |
//! | `POST` | `/:id/ignore`, `/:id/unignore` | [`ignore`] |

pub mod delete;
pub mod download;
pub mod edit;
pub mod form;
pub mod ignore;
pub mod index;
pub mod new;
pub mod result;
pub mod run;
pub mod task;

use serde::Deserialize;

use crate::error::DashboardError;

/// Banner flags carried in the query string after a redirect.
///
/// Only presence matters: `?deleted` and `?deleted=1` both set the flag.
#[derive(Debug, Default, Deserialize)]
pub struct Flags {
    /// A task was just deleted.
    pub deleted: Option<String>,
    /// A task was just created.
    pub added: Option<String>,
    /// A run was just queued.
    pub running: Option<String>,
    /// A task was just saved.
    pub edited: Option<String>,
    /// A rule was just ignored.
    #[serde(rename = "rule-ignored")]
    pub rule_ignored: Option<String>,
    /// A rule was just unignored.
    #[serde(rename = "rule-unignored")]
    pub rule_unignored: Option<String>,
}

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> DashboardError {
    DashboardError::NotFound("no route matched".to_owned())
}
