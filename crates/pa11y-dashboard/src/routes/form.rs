//! The task form shared by the create and edit pages.
//!
//! Multi-value fields are textareas with one entry per line; headers are
//! written `Name: value`. The same struct is deserialized from the POST
//! body and serialized back into the template when a submission is
//! rejected, so the user never loses what they typed.

use std::collections::BTreeMap;

use pa11y_types::{NewTask, Standard, Task, TaskEdits};
use serde::{Deserialize, Serialize};

use crate::presenter::PresentedTask;

/// Raw form fields, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskForm {
    /// Task name.
    pub name: String,
    /// URL under test.
    pub url: String,
    /// Standard wire name.
    pub standard: String,
    /// Ignored rule codes, one per line.
    pub ignore: String,
    /// Timeout in milliseconds.
    pub timeout: String,
    /// Wait in milliseconds.
    pub wait: String,
    /// Actions, one per line.
    pub actions: String,
    /// Basic auth user name.
    pub username: String,
    /// Basic auth password.
    pub password: String,
    /// Hidden-element selector.
    pub hide_elements: String,
    /// Headers, one `Name: value` per line.
    pub headers: String,
    /// Client tag.
    pub client: String,
}

/// Everything the form templates need.
#[derive(Debug, Serialize)]
pub struct FormView<'a> {
    /// Field values.
    pub form: &'a TaskForm,
    /// Standards offered in the select box.
    pub standards: [&'static str; 4],
    /// Validation message to show above the form.
    pub error: Option<&'a str>,
    /// The task being edited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<&'a PresentedTask>,
    /// Whether the task was just saved.
    pub edited: bool,
}

impl<'a> FormView<'a> {
    /// View for `form` with an optional validation message.
    pub fn new(form: &'a TaskForm, error: Option<&'a str>) -> Self {
        Self {
            form,
            standards: Standard::ALL.map(Standard::as_str),
            error,
            task: None,
            edited: false,
        }
    }
}

impl TaskForm {
    /// A blank form with the default standard selected.
    pub fn blank() -> Self {
        Self {
            standard: Standard::default().as_str().to_owned(),
            ..Self::default()
        }
    }

    /// Prefill the form from an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            url: task.url.clone(),
            standard: task.standard.as_str().to_owned(),
            ignore: task.ignore.join("\n"),
            timeout: task.timeout.map(|t| t.to_string()).unwrap_or_default(),
            wait: task.wait.map(|w| w.to_string()).unwrap_or_default(),
            actions: task.actions.join("\n"),
            username: task.username.clone().unwrap_or_default(),
            password: task.password.clone().unwrap_or_default(),
            hide_elements: task.hide_elements.clone().unwrap_or_default(),
            headers: task
                .headers
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("\n"),
            client: task.client.clone().unwrap_or_default(),
        }
    }

    /// Validate into a creation request.
    pub fn to_new_task(&self) -> Result<NewTask, String> {
        let name = required(&self.name, "Please enter a name for the task")?;
        let url = required(&self.url, "Please enter a URL to test")?;
        let standard = if self.standard.trim().is_empty() {
            Standard::default()
        } else {
            Standard::parse(self.standard.trim())
                .ok_or_else(|| format!("Unknown standard {}", self.standard.trim()))?
        };

        Ok(NewTask {
            name,
            url,
            standard,
            ignore: lines(&self.ignore),
            timeout: millis(&self.timeout, "Timeout")?,
            wait: millis(&self.wait, "Wait")?,
            actions: lines(&self.actions),
            username: optional(&self.username),
            password: optional(&self.password),
            hide_elements: optional(&self.hide_elements),
            headers: headers(&self.headers)?,
            client: optional(&self.client),
        })
    }

    /// Validate into a partial update. Blank text fields clear the value.
    pub fn to_edits(&self) -> Result<TaskEdits, String> {
        Ok(TaskEdits {
            name: Some(required(&self.name, "Please enter a name for the task")?),
            ignore: Some(lines(&self.ignore)),
            timeout: millis(&self.timeout, "Timeout")?,
            wait: millis(&self.wait, "Wait")?,
            actions: Some(lines(&self.actions)),
            username: Some(self.username.trim().to_owned()),
            password: Some(self.password.clone()),
            hide_elements: Some(self.hide_elements.trim().to_owned()),
            headers: Some(headers(&self.headers)?),
            client: Some(self.client.trim().to_owned()),
        })
    }
}

fn required(value: &str, message: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(message.to_owned())
    } else {
        Ok(value.to_owned())
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn lines(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

fn millis(value: &str, field: &str) -> Result<Option<u64>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|e| format!("{field} must be a whole number of milliseconds ({e})"))
}

fn headers(value: &str) -> Result<BTreeMap<String, String>, String> {
    lines(value)
        .into_iter()
        .map(|line| {
            line.split_once(':')
                .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| format!("Header \"{line}\" must look like Name: value"))
        })
        .collect()
}
