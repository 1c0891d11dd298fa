//! Task editing.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use pa11y_client::TaskQuery;
use pa11y_types::{Task, TaskId};

use crate::error::DashboardError;
use crate::presenter::present_task;
use crate::routes::Flags;
use crate::routes::form::{FormView, TaskForm};
use crate::routes::new::is_rejection;
use crate::state::AppState;
use crate::views::PageContext;

/// `GET /:id/edit`
pub async fn form(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(id): Path<String>,
    Query(flags): Query<Flags>,
) -> Result<Response, DashboardError> {
    let id = TaskId::new(id);
    let task = fetch(&state, &id).await?;
    render(&state, &page, &task, &TaskForm::from_task(&task), None, flags.edited.is_some())
}

/// `POST /:id/edit`
pub async fn update(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(id): Path<String>,
    Form(submitted): Form<TaskForm>,
) -> Result<Response, DashboardError> {
    let id = TaskId::new(id);
    let task = fetch(&state, &id).await?;

    let edits = match submitted.to_edits() {
        Ok(edits) => edits,
        Err(message) => return render(&state, &page, &task, &submitted, Some(&message), false),
    };

    match state.webservice.task(&id).edit(&edits).await {
        Ok(()) => Ok(Redirect::to(&format!("/{id}/edit?edited")).into_response()),
        Err(e) if is_rejection(&e) => {
            render(&state, &page, &task, &submitted, Some(&e.to_string()), false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn fetch(state: &AppState, id: &TaskId) -> Result<Task, DashboardError> {
    state
        .webservice
        .task(id)
        .get(&TaskQuery::default())
        .await
        .map_err(|e| DashboardError::lookup(e, format!("task {id}")))
}

fn render(
    state: &AppState,
    page: &PageContext,
    task: &Task,
    form: &TaskForm,
    error: Option<&str>,
    edited: bool,
) -> Result<Response, DashboardError> {
    let presented = present_task(task);
    let view = FormView {
        task: Some(&presented),
        edited,
        ..FormView::new(form, error)
    };
    Ok(state.views.render("edit", page, &view)?.into_response())
}
