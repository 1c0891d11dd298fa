//! Queue a new run of a task.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Redirect;
use pa11y_types::TaskId;

use crate::error::DashboardError;
use crate::state::AppState;

/// `GET /:id/run`
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, DashboardError> {
    let id = TaskId::new(id);
    state
        .webservice
        .task(&id)
        .run()
        .await
        .map_err(|e| DashboardError::lookup(e, format!("task {id}")))?;
    Ok(Redirect::to(&format!("/{id}?running")))
}
