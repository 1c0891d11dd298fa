//! Task listings: every task, or every task tagged with one client.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use pa11y_client::TaskQuery;
use serde::Serialize;

use crate::error::DashboardError;
use crate::presenter::{PresentedTask, present_task};
use crate::routes::Flags;
use crate::state::AppState;
use crate::views::PageContext;

#[derive(Serialize)]
struct ListingView<'a> {
    tasks: Vec<PresentedTask>,
    deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_home_page: Option<bool>,
    client: Option<&'a str>,
}

/// `GET /`
pub async fn home(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(flags): Query<Flags>,
) -> Result<Html<String>, DashboardError> {
    let tasks = state
        .webservice
        .tasks()
        .get(&TaskQuery::with_last_result())
        .await?;

    state.views.render(
        "index",
        &page,
        &ListingView {
            tasks: tasks.iter().map(present_task).collect(),
            deleted: flags.deleted.is_some(),
            is_home_page: None,
            client: None,
        },
    )
}

/// `GET /client/:client`
pub async fn client(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(client): Path<String>,
    Query(flags): Query<Flags>,
) -> Result<Html<String>, DashboardError> {
    let tasks = state
        .webservice
        .tasks()
        .get(&TaskQuery::for_client(client.as_str()))
        .await?;

    state.views.render(
        "index",
        &page,
        &ListingView {
            tasks: tasks.iter().map(present_task).collect(),
            deleted: flags.deleted.is_some(),
            is_home_page: Some(true),
            client: Some(&client),
        },
    )
}
