//! Records returned by the webservice.
//!
//! Field names follow the service's camelCase JSON. Optional fields the
//! service omits deserialize to their defaults so older service versions
//! stay readable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{IssueType, Standard};
use crate::ids::{ResultId, TaskId};

/// A configured accessibility test target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Service-assigned identifier.
    pub id: TaskId,
    /// Human-readable task name.
    pub name: String,
    /// The page under test.
    pub url: String,
    /// Standard the page is tested against.
    #[serde(default)]
    pub standard: Standard,
    /// Rule codes excluded from results.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Page load timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Delay before testing in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
    /// Scripted browser actions run before testing.
    #[serde(default)]
    pub actions: Vec<String>,
    /// HTTP basic auth user name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// HTTP basic auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// CSS selector of elements hidden from testing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_elements: Option<String>,
    /// Extra request headers sent with the page load.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Client or group tag the task belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Summary of the most recent run, when requested with `lastres`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<TaskResult>,
}

/// The outcome of running a task once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    /// Service-assigned identifier.
    pub id: ResultId,
    /// The task this result belongs to.
    pub task: TaskId,
    /// When the run finished.
    pub date: DateTime<Utc>,
    /// Issue totals by severity.
    #[serde(default)]
    pub count: ResultCount,
    /// Rules that were ignored during this run.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Individual findings. Only present when the result was fetched in full.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Issue>>,
}

impl TaskResult {
    /// Issues of the given severity, empty when the result is a summary.
    pub fn issues_of(&self, kind: IssueType) -> Vec<&Issue> {
        self.results
            .iter()
            .flatten()
            .filter(|issue| issue.kind == kind)
            .collect()
    }
}

/// Issue totals for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultCount {
    /// Every issue regardless of severity.
    #[serde(default)]
    pub total: u32,
    /// Errors.
    #[serde(default)]
    pub error: u32,
    /// Warnings.
    #[serde(default)]
    pub warning: u32,
    /// Notices.
    #[serde(default)]
    pub notice: u32,
}

/// A single accessibility finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Rule code, e.g. `WCAG2AA.Principle1.Guideline1_1.1_1_1.H37`.
    pub code: String,
    /// Markup snippet the issue was found in.
    #[serde(default)]
    pub context: String,
    /// Human-readable description.
    pub message: String,
    /// CSS selector of the offending element.
    #[serde(default)]
    pub selector: String,
    /// Severity.
    #[serde(rename = "type")]
    pub kind: IssueType,
    /// Numeric severity as reported by the test runner.
    #[serde(default)]
    pub type_code: u8,
}
