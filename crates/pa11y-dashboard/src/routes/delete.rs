//! Task deletion.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use pa11y_client::TaskQuery;
use pa11y_types::{Task, TaskId};
use serde::Serialize;

use crate::error::DashboardError;
use crate::presenter::{PresentedTask, client_href, present_task};
use crate::state::AppState;
use crate::views::PageContext;

#[derive(Serialize)]
struct DeleteView {
    task: PresentedTask,
}

/// `GET /:id/delete`
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<Html<String>, DashboardError> {
    let task = fetch(&state, &TaskId::new(id)).await?;
    state.views.render(
        "delete",
        &page,
        &DeleteView {
            task: present_task(&task),
        },
    )
}

/// `POST /:id/delete`
///
/// Tagged tasks return to their client listing, others to the home page.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Redirect, DashboardError> {
    let id = TaskId::new(id);
    let task = fetch(&state, &id).await?;
    state
        .webservice
        .task(&id)
        .remove()
        .await
        .map_err(|e| DashboardError::lookup(e, format!("task {id}")))?;

    Ok(Redirect::to(&after_delete(&task)))
}

fn after_delete(task: &Task) -> String {
    task.client
        .as_deref()
        .filter(|client| !client.is_empty())
        .map_or_else(
            || "/?deleted".to_owned(),
            |client| format!("{}?deleted", client_href(client)),
        )
}

async fn fetch(state: &AppState, id: &TaskId) -> Result<Task, DashboardError> {
    state
        .webservice
        .task(id)
        .get(&TaskQuery::default())
        .await
        .map_err(|e| DashboardError::lookup(e, format!("task {id}")))
}
