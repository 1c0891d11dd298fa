//! Result exports.
//!
//! `/:id/:rid.csv` and `/:id/:rid.json` share the result route; the
//! extension is split off the result id before the webservice is asked.

use axum::Json;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use pa11y_types::{Task, TaskResult};

use crate::presenter::{present_result, present_task};

/// Header row of the CSV export.
const CSV_HEADER: &str = r#""code","message","type","context","selector""#;

/// Export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    /// One quoted row per issue.
    Csv,
    /// The presented task and result.
    Json,
}

/// `r1.csv` -> (`r1`, Some(Csv)); `r1` -> (`r1`, None).
pub fn split_extension(rid: &str) -> (&str, Option<DownloadFormat>) {
    if let Some(stem) = rid.strip_suffix(".csv") {
        (stem, Some(DownloadFormat::Csv))
    } else if let Some(stem) = rid.strip_suffix(".json") {
        (stem, Some(DownloadFormat::Json))
    } else {
        (rid, None)
    }
}

/// Render `result` in `format`.
pub fn respond(format: DownloadFormat, task: &Task, result: &TaskResult) -> Response {
    match format {
        DownloadFormat::Csv => {
            let filename = format!("pa11y-{}-{}.csv", task.id, result.id);
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                to_csv(result),
            )
                .into_response()
        }
        DownloadFormat::Json => Json(serde_json::json!({
            "task": present_task(task),
            "result": present_result(result),
        }))
        .into_response(),
    }
}

/// CSV body for a result's issues.
pub fn to_csv(result: &TaskResult) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for issue in result.results.iter().flatten() {
        let row = [
            issue.code.as_str(),
            issue.message.as_str(),
            issue.kind.as_str(),
            issue.context.as_str(),
            issue.selector.as_str(),
        ]
        .map(quote)
        .join(",");
        csv.push_str(&row);
        csv.push('\n');
    }
    csv
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
