//! Task creation.

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use pa11y_client::ClientError;

use crate::error::DashboardError;
use crate::routes::form::{FormView, TaskForm};
use crate::state::AppState;
use crate::views::PageContext;

/// `GET /new`
pub async fn form(
    State(state): State<Arc<AppState>>,
    page: PageContext,
) -> Result<Html<String>, DashboardError> {
    state
        .views
        .render("new", &page, &FormView::new(&TaskForm::blank(), None))
}

/// `POST /new`
///
/// Local validation failures and 4xx answers from the webservice re-render
/// the form with the message; anything else goes to the fault handler.
pub async fn create(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(submitted): Form<TaskForm>,
) -> Result<Response, DashboardError> {
    let new_task = match submitted.to_new_task() {
        Ok(task) => task,
        Err(message) => return rerender(&state, &page, &submitted, &message),
    };

    match state.webservice.tasks().create(&new_task).await {
        Ok(task) => Ok(Redirect::to(&format!("/{}?added", task.id)).into_response()),
        Err(e) if is_rejection(&e) => rerender(&state, &page, &submitted, &e.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// The service rejected the request itself rather than failing.
pub(crate) fn is_rejection(error: &ClientError) -> bool {
    error.status().is_some_and(|s| (400..500).contains(&s))
}

fn rerender(
    state: &AppState,
    page: &PageContext,
    submitted: &TaskForm,
    message: &str,
) -> Result<Response, DashboardError> {
    let html = state
        .views
        .render("new", page, &FormView::new(submitted, Some(message)))?;
    Ok(html.into_response())
}
