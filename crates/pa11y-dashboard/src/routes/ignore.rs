//! Adding and removing rules on a task's ignore list.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::response::Redirect;
use pa11y_client::TaskQuery;
use pa11y_types::{TaskEdits, TaskId};
use serde::Deserialize;

use crate::error::DashboardError;
use crate::state::AppState;

/// Body of the ignore and unignore forms.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RuleForm {
    /// Rule code, e.g. `WCAG2AA.Principle1.Guideline1_1.1_1_1.H37`.
    pub rule: String,
}

/// `POST /:id/ignore`
pub async fn ignore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<RuleForm>,
) -> Result<Redirect, DashboardError> {
    let id = TaskId::new(id);
    let rule = form.rule.trim();
    update_rules(&state, &id, rule, |rules| {
        if !rules.iter().any(|r| r == rule) {
            rules.push(rule.to_owned());
        }
    })
    .await?;
    Ok(Redirect::to(&format!("/{id}?rule-ignored")))
}

/// `POST /:id/unignore`
pub async fn unignore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Form(form): Form<RuleForm>,
) -> Result<Redirect, DashboardError> {
    let id = TaskId::new(id);
    let rule = form.rule.trim();
    update_rules(&state, &id, rule, |rules| rules.retain(|r| r != rule)).await?;
    Ok(Redirect::to(&format!("/{id}?rule-unignored")))
}

/// Fetch the ignore list, apply `change`, and save it. Blank rules and
/// changes that leave the list as it was skip the save.
async fn update_rules(
    state: &AppState,
    id: &TaskId,
    rule: &str,
    change: impl FnOnce(&mut Vec<String>) + Send,
) -> Result<(), DashboardError> {
    if rule.is_empty() {
        return Ok(());
    }
    let endpoint = state.webservice.task(id);
    let task = endpoint
        .get(&TaskQuery::default())
        .await
        .map_err(|e| DashboardError::lookup(e, format!("task {id}")))?;

    let mut rules = task.ignore.clone();
    change(&mut rules);
    if rules == task.ignore {
        return Ok(());
    }
    endpoint.edit(&TaskEdits::ignore(rules)).await?;
    Ok(())
}
