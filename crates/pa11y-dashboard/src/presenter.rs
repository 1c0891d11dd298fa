//! Display-ready view models for tasks and results.

use std::collections::BTreeMap;

use pa11y_types::{Issue, IssueType, ResultCount, Task, TaskResult};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

/// Format used for result dates on every page.
const DISPLAY_DATE: &str = "%-d %b %Y, %H:%M";

/// A task as the templates see it.
#[derive(Debug, Clone, Serialize)]
pub struct PresentedTask {
    /// Task id.
    pub id: String,
    /// Human name.
    pub name: String,
    /// The tested URL.
    pub url: String,
    /// The URL without scheme or trailing slash.
    pub display_url: String,
    /// Accessibility standard name.
    pub standard: &'static str,
    /// Ignored rule codes.
    pub ignore: Vec<String>,
    /// Page load timeout in milliseconds.
    pub timeout: Option<u64>,
    /// Post-load wait in milliseconds.
    pub wait: Option<u64>,
    /// Browser actions run before testing.
    pub actions: Vec<String>,
    /// Selector of elements hidden before testing.
    pub hide_elements: Option<String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Client tag.
    pub client: Option<String>,
    /// `/client/{client}`, percent-encoded.
    pub href_client: Option<String>,
    /// `/{id}`
    pub href: String,
    /// `/{id}/edit`
    pub href_edit: String,
    /// `/{id}/delete`
    pub href_delete: String,
    /// `/{id}/run`
    pub href_run: String,
    /// `/{id}/ignore`
    pub href_ignore: String,
    /// `/{id}/unignore`
    pub href_unignore: String,
    /// Summary of the most recent run, if requested and available.
    pub last_result: Option<PresentedResult>,
}

/// A result as the templates see it.
#[derive(Debug, Clone, Serialize)]
pub struct PresentedResult {
    /// Result id.
    pub id: String,
    /// Owning task id.
    pub task: String,
    /// RFC 3339 timestamp.
    pub date: String,
    /// Human-readable timestamp.
    pub display_date: String,
    /// Issue counts.
    pub count: ResultCount,
    /// `/{task}/{id}`
    pub href: String,
    /// `/{task}/{id}.csv`
    pub href_csv: String,
    /// `/{task}/{id}.json`
    pub href_json: String,
    /// Error issues, when the result was fetched in full.
    pub errors: Vec<Issue>,
    /// Warning issues, when the result was fetched in full.
    pub warnings: Vec<Issue>,
    /// Notice issues, when the result was fetched in full.
    pub notices: Vec<Issue>,
    /// Whether the run found anything.
    pub has_issues: bool,
}

/// Build the view model for a task.
pub fn present_task(task: &Task) -> PresentedTask {
    let href = format!("/{}", task.id);
    PresentedTask {
        id: task.id.to_string(),
        name: task.name.clone(),
        url: task.url.clone(),
        display_url: display_url(&task.url),
        standard: task.standard.as_str(),
        ignore: task.ignore.clone(),
        timeout: task.timeout,
        wait: task.wait,
        actions: task.actions.clone(),
        hide_elements: task.hide_elements.clone(),
        headers: task.headers.clone(),
        client: task.client.clone(),
        href_client: task
            .client
            .as_deref()
            .filter(|client| !client.is_empty())
            .map(client_href),
        href_edit: format!("{href}/edit"),
        href_delete: format!("{href}/delete"),
        href_run: format!("{href}/run"),
        href_ignore: format!("{href}/ignore"),
        href_unignore: format!("{href}/unignore"),
        href,
        last_result: task.last_result.as_ref().map(present_result),
    }
}

/// Listing path for a client tag. The tag is free text, so it is encoded
/// as a single path segment.
pub fn client_href(client: &str) -> String {
    format!("/client/{}", utf8_percent_encode(client, NON_ALPHANUMERIC))
}

/// Build the view model for a result.
pub fn present_result(result: &TaskResult) -> PresentedResult {
    let href = format!("/{}/{}", result.task, result.id);
    let issues = |kind| {
        result
            .issues_of(kind)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    };
    PresentedResult {
        id: result.id.to_string(),
        task: result.task.to_string(),
        date: result.date.to_rfc3339(),
        display_date: result.date.format(DISPLAY_DATE).to_string(),
        count: result.count,
        href_csv: format!("{href}.csv"),
        href_json: format!("{href}.json"),
        href,
        errors: issues(IssueType::Error),
        warnings: issues(IssueType::Warning),
        notices: issues(IssueType::Notice),
        has_issues: result.count.total > 0,
    }
}

/// `https://example.com/path/` -> `example.com/path`.
pub fn display_url(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest);
    without_scheme
        .strip_suffix('/')
        .unwrap_or(without_scheme)
        .to_owned()
}
