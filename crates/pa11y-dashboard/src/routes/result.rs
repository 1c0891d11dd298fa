//! The result page and its downloads.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use pa11y_client::{ResultQuery, TaskQuery};
use pa11y_types::{ResultId, TaskId};
use serde::Serialize;

use crate::error::DashboardError;
use crate::presenter::{PresentedResult, PresentedTask, present_result, present_task};
use crate::routes::download;
use crate::state::AppState;
use crate::views::PageContext;

#[derive(Serialize)]
struct ResultView {
    task: PresentedTask,
    result: PresentedResult,
    is_result_page: bool,
}

/// `GET /:id/:rid`, `GET /:id/:rid.csv`, `GET /:id/:rid.json`
pub async fn show(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path((id, rid)): Path<(String, String)>,
) -> Result<Response, DashboardError> {
    let (rid, format) = download::split_extension(&rid);
    let id = TaskId::new(id);
    let rid = ResultId::new(rid);
    let endpoint = state.webservice.task(&id);

    let task = endpoint
        .get(&TaskQuery::default())
        .await
        .map_err(|e| DashboardError::lookup(e, format!("task {id}")))?;
    let result = endpoint
        .result(&rid)
        .get(&ResultQuery::full())
        .await
        .map_err(|e| DashboardError::lookup(e, format!("result {rid} of task {id}")))?;

    if let Some(format) = format {
        return Ok(download::respond(format, &task, &result));
    }

    let html = state.views.render(
        "result",
        &page,
        &ResultView {
            task: present_task(&task),
            result: present_result(&result),
            is_result_page: true,
        },
    )?;
    Ok(html.into_response())
}
