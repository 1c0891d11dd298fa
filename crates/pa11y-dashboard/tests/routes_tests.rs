//! Integration tests for the dashboard routes.
//!
//! The router is driven through `tower::ServiceExt::oneshot` without a TCP
//! listener of its own; the webservice behind it is a fake axum app.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use pa11y_dashboard::config::RunMode;
use pa11y_dashboard::fault::FaultKind;
use pa11y_dashboard::supervisor::ShutdownRequest;
use pa11y_dashboard::{AppState, DashboardConfig, build_router};
use serde_json::Value;
use tower::ServiceExt;

use common::{Log, body_text, refused_webservice, start_fake_webservice, state, test_config};

async fn get(state: &Arc<AppState>, uri: &str) -> Response<Body> {
    build_router(Arc::clone(state))
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(state: &Arc<AppState>, uri: &str, form: &str) -> Response<Body> {
    build_router(Arc::clone(state))
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn mutations(log: &Log) -> Vec<String> {
    log.lock()
        .iter()
        .filter(|line| !line.starts_with("GET "))
        .cloned()
        .collect()
}

async fn dashboard() -> (Arc<AppState>, Log) {
    let (url, log) = start_fake_webservice().await;
    (state(&test_config(&url)), log)
}

async fn readonly_dashboard() -> (Arc<AppState>, Log) {
    let (url, log) = start_fake_webservice().await;
    let config = DashboardConfig {
        readonly: true,
        ..test_config(&url)
    };
    (state(&config), log)
}

// =========================================================================
// Listings
// =========================================================================

#[tokio::test]
async fn client_listing_asks_for_last_results_of_that_client() {
    let (state, log) = dashboard().await;

    let response = get(&state, "/client/abc").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*log.lock(), vec!["GET /tasks?lastres=true&client=abc"]);
    let html = body_text(response).await;
    assert!(html.contains("Tasks for abc"));
    assert!(html.contains("Task t1"));
    assert!(html.contains("Task t2"));
}

#[tokio::test]
async fn home_lists_every_task_with_last_result() {
    let (state, log) = dashboard().await;

    let response = get(&state, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*log.lock(), vec!["GET /tasks?lastres=true"]);
    let html = body_text(response).await;
    assert!(html.contains("All tasks"));
    assert!(html.contains("1 errors"));
    assert!(!html.contains("The URL was deleted."));
}

#[tokio::test]
async fn deleted_flag_shows_the_banner() {
    let (state, _log) = dashboard().await;

    let html = body_text(get(&state, "/client/abc?deleted").await).await;

    assert!(html.contains("The URL was deleted."));
}

#[tokio::test]
async fn layout_carries_site_locals() {
    let (url, _log) = start_fake_webservice().await;
    let config = DashboardConfig {
        site_message: Some("Scheduled maintenance".to_owned()),
        ..test_config(&url)
    };
    let state = state(&config);

    let html = body_text(get(&state, "/").await).await;

    assert!(html.contains(r#"<html lang="en">"#));
    assert!(html.contains(r#"content="noindex, nofollow""#));
    assert!(html.contains("Scheduled maintenance"));
    assert!(html.contains("Add a new URL"));
}

// =========================================================================
// Task and result pages
// =========================================================================

#[tokio::test]
async fn task_page_shows_latest_result_and_flags() {
    let (state, log) = dashboard().await;

    let response = get(&state, "/t1?added").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Task t1"));
    assert!(html.contains("The URL was added."));
    assert!(html.contains("Img element missing an alt attribute"));
    assert!(html.contains("Previous results"));
    assert!(html.contains("r1.csv"));
    assert_eq!(
        *log.lock(),
        vec![
            "GET /tasks/t1?lastres=true",
            "GET /tasks/t1/results?full=true"
        ]
    );
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let (state, _log) = dashboard().await;

    let response = get(&state, "/missing").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
    assert_eq!(state.supervisor.requested(), None);
}

#[tokio::test]
async fn result_page_lists_issues() {
    let (state, log) = dashboard().await;

    let response = get(&state, "/t1/r1").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Img element missing an alt attribute"));
    assert!(html.contains("Check that lists are marked up"));
    assert!(log.lock().contains(&"GET /tasks/t1/results/r1?full=true".to_owned()));
}

#[tokio::test]
async fn unknown_result_is_not_found() {
    let (state, _log) = dashboard().await;

    assert_eq!(get(&state, "/t1/nope").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn result_downloads_as_csv() {
    let (state, _log) = dashboard().await;

    let response = get(&state, "/t1/r1.csv").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("pa11y-t1-r1.csv")
    );
    let csv = body_text(response).await;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(r#""code","message","type","context","selector""#)
    );
    assert_eq!(
        lines.next(),
        Some(
            r#""WCAG2AA.Principle1.Guideline1_1.1_1_1.H37","Img element missing an alt attribute","error","<img src=""logo.png"">","html > body > img""#
        )
    );
    assert_eq!(lines.count(), 1);
}

#[tokio::test]
async fn result_downloads_as_json() {
    let (state, _log) = dashboard().await;

    let response = get(&state, "/t1/r1.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["task"]["id"], "t1");
    assert_eq!(json["result"]["id"], "r1");
    assert_eq!(json["result"]["errors"].as_array().unwrap().len(), 1);
}

// =========================================================================
// Mutations
// =========================================================================

#[tokio::test]
async fn creating_a_task_redirects_to_it() {
    let (state, log) = dashboard().await;

    let response = post_form(
        &state,
        "/new",
        "name=Home&url=https%3A%2F%2Fexample.com%2F&standard=WCAG2A&ignore=rule-a%0Arule-b",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/t-new?added");
    let posted = mutations(&log);
    assert_eq!(posted.len(), 1);
    let body: Value = serde_json::from_str(
        posted.first().unwrap().trim_start_matches("POST /tasks "),
    )
    .unwrap();
    assert_eq!(body["name"], "Home");
    assert_eq!(body["standard"], "WCAG2A");
    assert_eq!(body["ignore"], serde_json::json!(["rule-a", "rule-b"]));
}

#[tokio::test]
async fn webservice_validation_errors_rerender_the_form() {
    let (state, _log) = dashboard().await;

    let response = post_form(&state, "/new", "name=reject&url=not-a-url").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("url must be a valid uri"));
    assert!(html.contains(r#"value="not-a-url""#));
    assert_eq!(state.supervisor.requested(), None);
}

#[tokio::test]
async fn local_validation_errors_never_reach_the_webservice() {
    let (state, log) = dashboard().await;

    let response = post_form(&state, "/new", "name=Home&url=").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Please enter a URL to test"));
    assert!(mutations(&log).is_empty());
}

#[tokio::test]
async fn editing_patches_the_task() {
    let (state, log) = dashboard().await;

    let response = post_form(&state, "/t1/edit", "name=Renamed&ignore=rule-a&wait=500").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/t1/edit?edited");
    let patched = mutations(&log);
    assert_eq!(patched.len(), 1);
    let body: Value = serde_json::from_str(
        patched.first().unwrap().trim_start_matches("PATCH /tasks/t1 "),
    )
    .unwrap();
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["wait"], 500);
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let (state, _log) = dashboard().await;

    let html = body_text(get(&state, "/t1/edit?edited").await).await;

    assert!(html.contains(r#"value="Task t1""#));
    assert!(html.contains("Your changes were saved."));
}

#[tokio::test]
async fn deleting_a_tagged_task_returns_to_its_client() {
    let (state, log) = dashboard().await;

    let response = post_form(&state, "/t1/delete", "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/client/abc?deleted");
    assert_eq!(mutations(&log), vec!["DELETE /tasks/t1"]);
}

#[tokio::test]
async fn deleting_an_untagged_task_returns_home() {
    let (state, _log) = dashboard().await;

    let response = post_form(&state, "/t2/delete", "").await;

    assert_eq!(location(&response), "/?deleted");
}

#[tokio::test]
async fn deleting_returns_to_an_encoded_client_listing() {
    let (state, log) = dashboard().await;

    let response = post_form(&state, "/t3/delete", "").await;

    assert_eq!(location(&response), "/client/acme%20%231?deleted");

    let listing = get(&state, location(&response)).await;
    assert_eq!(listing.status(), StatusCode::OK);
    let html = body_text(listing).await;
    assert!(html.contains("Tasks for acme #1"));
    assert!(html.contains("The URL was deleted."));
    assert_eq!(
        log.lock().last().map(String::as_str),
        Some("GET /tasks?lastres=true&client=acme+%231")
    );
}

#[tokio::test]
async fn running_queues_and_redirects() {
    let (state, log) = dashboard().await;

    let response = get(&state, "/t1/run").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/t1?running");
    assert_eq!(mutations(&log), vec!["POST /tasks/t1/run"]);
}

#[tokio::test]
async fn ignoring_appends_the_rule() {
    let (state, log) = dashboard().await;

    let response = post_form(&state, "/t1/ignore", "rule=rule-b").await;

    assert_eq!(location(&response), "/t1?rule-ignored");
    assert_eq!(
        mutations(&log),
        vec![r#"PATCH /tasks/t1 {"ignore":["rule-a","rule-b"]}"#]
    );
}

#[tokio::test]
async fn unignoring_removes_the_rule() {
    let (state, log) = dashboard().await;

    let response = post_form(&state, "/t1/unignore", "rule=rule-a").await;

    assert_eq!(location(&response), "/t1?rule-unignored");
    assert_eq!(mutations(&log), vec![r#"PATCH /tasks/t1 {"ignore":[]}"#]);
}

#[tokio::test]
async fn ignoring_an_already_ignored_rule_skips_the_save() {
    let (state, log) = dashboard().await;

    let response = post_form(&state, "/t1/ignore", "rule=rule-a").await;

    assert_eq!(location(&response), "/t1?rule-ignored");
    assert!(mutations(&log).is_empty());
}

// =========================================================================
// Read-only mode and 404s
// =========================================================================

#[tokio::test]
async fn readonly_mode_has_no_mutating_routes() {
    let (state, log) = readonly_dashboard().await;

    for (method, uri) in [
        (Method::GET, "/new"),
        (Method::POST, "/new"),
        (Method::GET, "/t1/edit"),
        (Method::POST, "/t1/edit"),
        (Method::GET, "/t1/delete"),
        (Method::POST, "/t1/delete"),
        (Method::GET, "/t1/run"),
        (Method::POST, "/t1/ignore"),
        (Method::POST, "/t1/unignore"),
    ] {
        let response = build_router(Arc::clone(&state))
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("rule=x&name=a&url=b"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
    }

    assert!(mutations(&log).is_empty());
    assert_eq!(state.supervisor.requested(), None);
}

#[tokio::test]
async fn readonly_write_paths_never_reach_the_webservice() {
    let url = refused_webservice().await;
    let state = state(&DashboardConfig {
        readonly: true,
        ..test_config(&url)
    });

    for (method, uri) in [
        (Method::GET, "/new"),
        (Method::POST, "/new"),
        (Method::GET, "/t1/edit"),
        (Method::GET, "/t1/delete"),
        (Method::POST, "/t1/delete"),
        (Method::GET, "/t1/run"),
        (Method::POST, "/t1/ignore"),
        (Method::POST, "/t1/unignore"),
    ] {
        let response = build_router(Arc::clone(&state))
            .oneshot(
                Request::builder()
                    .method(method.clone())
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
    }

    assert_eq!(state.supervisor.requested(), None);
}

#[tokio::test]
async fn readonly_layout_hides_the_add_link() {
    let (state, _log) = readonly_dashboard().await;

    let html = body_text(get(&state, "/").await).await;

    assert!(!html.contains("Add a new URL"));
}

#[tokio::test]
async fn unknown_paths_are_not_found_in_every_mode() {
    for readonly in [false, true] {
        let (url, log) = start_fake_webservice().await;
        let state = state(&DashboardConfig {
            readonly,
            ..test_config(&url)
        });

        let response = get(&state, "/no/such/page").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page not found"));
        assert!(log.lock().is_empty());
    }
}

#[tokio::test]
async fn assets_are_served_with_cache_headers() {
    let (state, _log) = dashboard().await;

    let response = get(&state, "/assets/css/site.css").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=0"
    );

    let missing = get(&state, "/assets/css/missing.css").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(body_text(missing).await.contains("Page not found"));
}

#[tokio::test]
async fn production_assets_are_cached_for_a_week() {
    let (url, _log) = start_fake_webservice().await;
    let state = state(&DashboardConfig {
        env: RunMode::Production,
        ..test_config(&url)
    });

    let response = get(&state, "/assets/css/site.css").await;

    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=604800"
    );
}

// =========================================================================
// Fault handling
// =========================================================================

#[tokio::test]
async fn refused_webservice_renders_500_and_requests_restart() {
    let url = refused_webservice().await;
    let state = state(&test_config(&url));

    let response = get(&state, "/").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body_text(response)
            .await
            .contains("Could not connect to pa11y-webservice")
    );
    assert_eq!(
        state.supervisor.requested(),
        Some(ShutdownRequest::Restart {
            reason: "Could not connect to pa11y-webservice".to_owned()
        })
    );
}

#[tokio::test]
async fn production_hides_error_details() {
    let url = refused_webservice().await;
    let state = state(&DashboardConfig {
        env: RunMode::Production,
        ..test_config(&url)
    });

    let response = get(&state, "/").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let html = body_text(response).await;
    assert!(html.contains("Something went wrong"));
    assert!(!html.contains("Could not connect to pa11y-webservice"));
}

#[tokio::test]
async fn route_errors_are_published() {
    let url = refused_webservice().await;
    let state = state(&test_config(&url));
    let mut events = state.subscribe_route_errors();

    get(&state, "/client/abc").await;

    let event = events.try_recv().unwrap();
    assert_eq!(event.kind, FaultKind::ServiceUnreachable);
    assert_eq!(event.method, "GET");
    assert_eq!(event.path, "/client/abc");
    assert_eq!(event.message, "Could not connect to pa11y-webservice");
}

#[tokio::test]
async fn lenient_policy_keeps_serving() {
    let url = refused_webservice().await;
    let state = state(&DashboardConfig {
        fail_fast: false,
        ..test_config(&url)
    });

    let response = get(&state, "/").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(state.supervisor.requested(), None);
}

#[tokio::test]
async fn hang_up_requests_teardown() {
    let url = common::hanging_up_webservice().await;
    let state = state(&test_config(&url));

    let response = get(&state, "/").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(response).await.contains("socket hang up"));
    assert!(matches!(
        state.supervisor.requested(),
        Some(ShutdownRequest::Teardown { .. })
    ));
}
