//! Axum router construction for the dashboard.
//!
//! The route table is chosen once from
//! [`Capabilities`](crate::state::Capabilities): read routes are
//! always present, mutating routes exist only when `can_mutate` is set. In
//! read-only mode the mutating paths are claimed by the 404 handler instead,
//! otherwise `/new` and `/:id/edit` would match `/:id` and `/:id/:rid` and
//! reach the webservice.

use std::sync::Arc;

use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderValue, header};
use axum::middleware;
use axum::routing::{any, get, post};
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::fault;
use crate::routes::{self, delete, edit, ignore, index, new, result, run, task};
use crate::state::AppState;

/// Static assets are cached for a week in production.
const PRODUCTION_ASSET_CACHE: &str = "public, max-age=604800";

/// Outside production, assets are always revalidated.
const DEVELOPMENT_ASSET_CACHE: &str = "public, max-age=0";

/// Paths served by [`write_routes`].
const WRITE_PATHS: [&str; 6] = [
    "/new",
    "/{id}/edit",
    "/{id}/delete",
    "/{id}/run",
    "/{id}/ignore",
    "/{id}/unignore",
];

/// Build the complete router for the dashboard.
///
/// Read routes:
/// - `GET /` -- every task with its last result
/// - `GET /client/:client` -- tasks tagged with one client
/// - `GET /:id` -- task page
/// - `GET /:id/:rid` -- result page, `.csv` and `.json` downloads
///
/// Mutating routes, when [`can_mutate`](crate::state::Capabilities::can_mutate)
/// is set:
/// - `GET|POST /new`, `GET|POST /:id/edit`, `GET|POST /:id/delete`
/// - `GET /:id/run`, `POST /:id/ignore`, `POST /:id/unignore`
///
/// Everything else, including a known path with the wrong method, gets the
/// 404 page.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = read_routes().merge(if state.capabilities.can_mutate {
        write_routes()
    } else {
        blocked_write_routes()
    });

    // Missing assets get the 404 page like any other unknown path.
    let assets = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        asset_cache_control(state.production()),
    )
    .layer(ServeDir::new(&state.public_dir).fallback(routes::not_found.into_service()));

    router
        .nest_service("/assets", assets)
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::not_found)
        .layer(CatchPanicLayer::custom(fault::panic_response))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            fault::render_failures,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn read_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index::home))
        .route("/client/{client}", get(index::client))
        .route("/{id}", get(task::show))
        .route("/{id}/{rid}", get(result::show))
}

fn write_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/new", get(new::form).post(new::create))
        .route("/{id}/edit", get(edit::form).post(edit::update))
        .route("/{id}/delete", get(delete::confirm).post(delete::remove))
        .route("/{id}/run", get(run::start))
        .route("/{id}/ignore", post(ignore::ignore))
        .route("/{id}/unignore", post(ignore::unignore))
}

/// Every write path answers 404 without touching the webservice.
fn blocked_write_routes() -> Router<Arc<AppState>> {
    WRITE_PATHS
        .into_iter()
        .fold(Router::new(), |router, path| router.route(path, any(routes::not_found)))
}

/// `Cache-Control` for files under `/assets`.
const fn asset_cache_control(production: bool) -> HeaderValue {
    HeaderValue::from_static(if production {
        PRODUCTION_ASSET_CACHE
    } else {
        DEVELOPMENT_ASSET_CACHE
    })
}
