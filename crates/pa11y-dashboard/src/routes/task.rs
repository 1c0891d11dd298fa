//! The task page: latest result plus run history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use pa11y_client::{ResultQuery, TaskQuery};
use pa11y_types::TaskId;
use serde::Serialize;

use crate::error::DashboardError;
use crate::presenter::{PresentedResult, PresentedTask, present_result, present_task};
use crate::routes::Flags;
use crate::state::AppState;
use crate::views::PageContext;

#[derive(Serialize)]
struct TaskView {
    task: PresentedTask,
    results: Vec<PresentedResult>,
    main_result: Option<PresentedResult>,
    has_one_result: bool,
    added: bool,
    running: bool,
    rule_ignored: bool,
    rule_unignored: bool,
    is_task_page: bool,
}

/// `GET /:id`
pub async fn show(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(id): Path<String>,
    Query(flags): Query<Flags>,
) -> Result<Html<String>, DashboardError> {
    let id = TaskId::new(id);
    let endpoint = state.webservice.task(&id);

    let task = endpoint
        .get(&TaskQuery::with_last_result())
        .await
        .map_err(|e| DashboardError::lookup(e, format!("task {id}")))?;
    let results: Vec<_> = endpoint
        .results(&ResultQuery::full())
        .await?
        .iter()
        .map(present_result)
        .collect();

    state.views.render(
        "task",
        &page,
        &TaskView {
            task: present_task(&task),
            main_result: results.first().cloned(),
            has_one_result: results.len() < 2,
            results,
            added: flags.added.is_some(),
            running: flags.running.is_some(),
            rule_ignored: flags.rule_ignored.is_some(),
            rule_unignored: flags.rule_unignored.is_some(),
            is_task_page: true,
        },
    )
}
