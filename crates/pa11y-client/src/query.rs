//! Query-string filters accepted by the webservice.

use serde::Serialize;

/// Filter for task lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskQuery {
    /// Include each task's most recent result summary.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub lastres: bool,
    /// Only return tasks tagged with this client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

impl TaskQuery {
    /// Ask for each task's last result.
    pub const fn with_last_result() -> Self {
        Self {
            lastres: true,
            client: None,
        }
    }

    /// Ask for the last results of every task tagged with `client`.
    pub fn for_client(client: impl Into<String>) -> Self {
        Self {
            lastres: true,
            client: Some(client.into()),
        }
    }
}

/// Filter for result lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultQuery {
    /// Earliest result date, as an ISO 8601 string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Latest result date, as an ISO 8601 string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Include the individual issues, not just the counts.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub full: bool,
}

impl ResultQuery {
    /// Ask for results including every issue.
    pub const fn full() -> Self {
        Self {
            from: None,
            to: None,
            full: true,
        }
    }
}
