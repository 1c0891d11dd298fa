//! Shared helpers for the dashboard integration tests.
//!
//! [`start_fake_webservice`] runs a small axum app on `127.0.0.1:0` that
//! answers like pa11y-webservice and records every request it receives.

#![allow(clippy::unwrap_used, dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use pa11y_dashboard::{AppState, DashboardConfig, WebserviceAddress};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

/// Requests seen by the fake, as `METHOD /path?query [body]`.
pub type Log = Arc<Mutex<Vec<String>>>;

/// A result with one error and one notice.
pub fn full_result(task: &str, id: &str) -> Value {
    json!({
        "id": id,
        "task": task,
        "date": "2024-03-01T10:00:00Z",
        "count": {"total": 2, "error": 1, "warning": 0, "notice": 1},
        "results": [
            {
                "code": "WCAG2AA.Principle1.Guideline1_1.1_1_1.H37",
                "message": "Img element missing an alt attribute",
                "type": "error",
                "typeCode": 1,
                "context": "<img src=\"logo.png\">",
                "selector": "html > body > img"
            },
            {
                "code": "WCAG2AA.Principle1.Guideline1_3.1_3_1.H48",
                "message": "Check that lists are marked up",
                "type": "notice",
                "typeCode": 3,
                "context": "<p>",
                "selector": "html > body > p"
            }
        ]
    })
}

fn task_json(id: &str, client: Option<&str>) -> Value {
    let mut task = json!({
        "id": id,
        "name": format!("Task {id}"),
        "url": "https://example.com/",
        "standard": "WCAG2AA",
        "ignore": ["rule-a"],
        "lastResult": {
            "id": "r1",
            "task": id,
            "date": "2024-03-01T10:00:00Z",
            "count": {"total": 2, "error": 1, "warning": 0, "notice": 1}
        }
    });
    if let Some(client) = client {
        task["client"] = json!(client);
    }
    task
}

fn record(log: &Log, line: String) {
    log.lock().push(line);
}

async fn list_tasks(State(log): State<Log>, RawQuery(query): RawQuery) -> Json<Value> {
    record(&log, format!("GET /tasks?{}", query.unwrap_or_default()));
    Json(json!([task_json("t1", Some("abc")), task_json("t2", Some("abc"))]))
}

async fn create_task(
    State(log): State<Log>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&log, format!("POST /tasks {body}"));
    if body["name"] == "reject" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"statusCode": 400, "message": "url must be a valid uri"})),
        );
    }
    let mut task = body;
    task["id"] = json!("t-new");
    (StatusCode::CREATED, Json(task))
}

async fn get_task(
    State(log): State<Log>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, StatusCode> {
    record(&log, format!("GET /tasks/{id}?{}", query.unwrap_or_default()));
    match id.as_str() {
        "t1" => Ok(Json(task_json("t1", Some("abc")))),
        "t2" => Ok(Json(task_json("t2", None))),
        "t3" => Ok(Json(task_json("t3", Some("acme #1")))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn edit_task(
    State(log): State<Log>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    record(&log, format!("PATCH /tasks/{id} {body}"));
    StatusCode::OK
}

async fn delete_task(State(log): State<Log>, Path(id): Path<String>) -> StatusCode {
    record(&log, format!("DELETE /tasks/{id}"));
    StatusCode::NO_CONTENT
}

async fn run_task(State(log): State<Log>, Path(id): Path<String>) -> StatusCode {
    record(&log, format!("POST /tasks/{id}/run"));
    StatusCode::ACCEPTED
}

async fn list_results(
    State(log): State<Log>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    record(
        &log,
        format!("GET /tasks/{id}/results?{}", query.unwrap_or_default()),
    );
    let mut older = full_result(&id, "r0");
    older["date"] = json!("2024-02-01T10:00:00Z");
    Json(json!([full_result(&id, "r1"), older]))
}

async fn get_result(
    State(log): State<Log>,
    Path((id, rid)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, StatusCode> {
    record(
        &log,
        format!("GET /tasks/{id}/results/{rid}?{}", query.unwrap_or_default()),
    );
    if rid == "r1" {
        Ok(Json(full_result(&id, &rid)))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Start the fake webservice. Returns its base URL and request log.
pub async fn start_fake_webservice() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(edit_task).delete(delete_task),
        )
        .route("/tasks/{id}/run", post(run_task))
        .route("/tasks/{id}/results", get(list_results))
        .route("/tasks/{id}/results/{rid}", get(get_result))
        .with_state(Arc::clone(&log));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), log)
}

/// A base URL nothing is listening on.
pub async fn refused_webservice() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

/// A webservice that reads each request and hangs up without answering.
pub async fn hanging_up_webservice() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0_u8; 1024];
            let _ = stream.read(&mut buf).await;
            drop(stream);
        }
    });
    format!("http://{addr}/")
}

/// Config for a test dashboard on a free local port.
pub fn test_config(webservice: &str) -> DashboardConfig {
    DashboardConfig {
        webservice: WebserviceAddress::Url(webservice.to_owned()),
        host: "127.0.0.1".to_owned(),
        port: 0,
        shutdown_grace_ms: 200,
        public_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
        ..DashboardConfig::default()
    }
}

/// State for `config`.
pub fn state(config: &DashboardConfig) -> Arc<AppState> {
    Arc::new(AppState::new(config).unwrap())
}

/// Collect a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Wait up to five seconds for `check` to hold.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}
