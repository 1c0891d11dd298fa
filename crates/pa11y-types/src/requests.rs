//! Payloads sent to the webservice.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::Standard;

/// Body of a task creation request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Human-readable task name.
    pub name: String,
    /// The page under test.
    pub url: String,
    /// Standard to test against.
    pub standard: Standard,
    /// Rule codes to exclude.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    /// Page load timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Delay before testing in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
    /// Scripted browser actions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// HTTP basic auth user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// HTTP basic auth password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// CSS selector of elements hidden from testing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_elements: Option<String>,
    /// Extra request headers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Client or group tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

/// Body of a partial task update. Absent fields are left unchanged.
///
/// The service does not allow the URL or standard of an existing task to
/// change, so neither appears here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdits {
    /// New task name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement ignore list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,
    /// New timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// New wait.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<u64>,
    /// Replacement action list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    /// New basic auth user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New basic auth password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New hidden-element selector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_elements: Option<String>,
    /// Replacement headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// New client tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

impl TaskEdits {
    /// An edit that only replaces the ignore list.
    pub fn ignore(rules: Vec<String>) -> Self {
        Self {
            ignore: Some(rules),
            ..Self::default()
        }
    }
}
