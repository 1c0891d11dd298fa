//! The single point where route failures are handled.
//!
//! Handlers return [`DashboardError`]; [`render_failures`] wraps the whole
//! router, finds the [`RouteFailure`] tagged onto a failed response, and:
//!
//! 1. renders the 404 view for [`DashboardError::NotFound`] and stops there
//! 2. otherwise classifies the failure into a [`RouteFault`], logs it, and
//!    publishes a [`RouteErrorEvent`]
//! 3. renders the 500 view, exposing the message only outside production
//! 4. asks the [`Supervisor`](crate::supervisor::Supervisor) to stop the
//!    server when the [`FaultPolicy`] says so
//!
//! A dropped webservice connection always tears the server down. Every other
//! failure stops it too while `fail_fast` is set, which is the default.

use std::any::Any;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use pa11y_client::TransportCode;
use serde::Serialize;
use tracing::{error, warn};

use crate::error::{DashboardError, RouteFailure};
use crate::state::AppState;
use crate::supervisor::ShutdownRequest;
use crate::views::PageContext;

/// Shown when the webservice refuses connections.
pub const SERVICE_UNREACHABLE_MESSAGE: &str = "Could not connect to pa11y-webservice";

/// Shown when the webservice drops a connection mid-request.
pub const SOCKET_HANG_UP_MESSAGE: &str = "socket hang up";

/// Classification of a route failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// The webservice refused the connection.
    ServiceUnreachable,
    /// The webservice closed the connection mid-request.
    SocketHangUp,
    /// Anything else.
    Other,
}

/// What happens to the server after a failure has been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep serving.
    Respond,
    /// Stop serving and exit non-zero once open connections drain.
    Restart,
    /// Stop serving, destroy every open connection, exit non-zero.
    Teardown,
}

/// Maps fault kinds to dispositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultPolicy {
    /// Treat every failure as fatal to the server.
    pub fail_fast: bool,
}

impl Default for FaultPolicy {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

impl FaultPolicy {
    /// The disposition for a fault of `kind`.
    pub const fn disposition(self, kind: FaultKind) -> Disposition {
        match kind {
            FaultKind::SocketHangUp => Disposition::Teardown,
            _ if self.fail_fast => Disposition::Restart,
            _ => Disposition::Respond,
        }
    }
}

/// A classified route failure with its user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFault {
    /// Classification.
    pub kind: FaultKind,
    /// Message shown on the error page and logged.
    pub message: String,
}

impl RouteFault {
    /// Classify a handler error.
    pub fn classify(error: &DashboardError) -> Self {
        let transport = match error {
            DashboardError::Webservice(e) => e.transport_code(),
            _ => None,
        };
        match transport {
            Some(TransportCode::ConnectionRefused) => Self {
                kind: FaultKind::ServiceUnreachable,
                message: SERVICE_UNREACHABLE_MESSAGE.to_owned(),
            },
            Some(TransportCode::ConnectionReset) => Self {
                kind: FaultKind::SocketHangUp,
                message: SOCKET_HANG_UP_MESSAGE.to_owned(),
            },
            _ => Self {
                kind: FaultKind::Other,
                message: error.to_string(),
            },
        }
    }
}

/// Published on the route-error channel for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteErrorEvent {
    /// Classification.
    pub kind: FaultKind,
    /// User-facing message.
    pub message: String,
    /// Request method.
    pub method: String,
    /// Request path.
    pub path: String,
}

#[derive(Serialize)]
struct ErrorView<'a> {
    error: Option<ErrorDetail<'a>>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
}

/// Middleware rendering every tagged failure into a 404 or 500 page.
pub async fn render_failures(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_owned();
    let page = PageContext::from_parts(request.uri(), request.headers());

    let mut response = next.run(request).await;
    let Some(RouteFailure(failure)) = response.extensions_mut().remove::<RouteFailure>() else {
        return response;
    };

    if matches!(failure.as_ref(), DashboardError::NotFound(_)) {
        return render_status_page(
            &state,
            &page,
            StatusCode::NOT_FOUND,
            "404",
            &ErrorView { error: None },
        );
    }

    let fault = RouteFault::classify(&failure);
    error!(kind = ?fault.kind, %method, %path, error = %failure, "{}", fault.message);
    state.publish_route_error(&RouteErrorEvent {
        kind: fault.kind,
        message: fault.message.clone(),
        method,
        path,
    });

    let view = ErrorView {
        error: (!state.production()).then_some(ErrorDetail {
            message: &fault.message,
        }),
    };
    let response = render_status_page(
        &state,
        &page,
        StatusCode::INTERNAL_SERVER_ERROR,
        "500",
        &view,
    );

    match state.policy.disposition(fault.kind) {
        Disposition::Respond => {}
        Disposition::Restart => {
            warn!(reason = %fault.message, "route failure is fatal, stopping server");
            state.supervisor.request(ShutdownRequest::Restart {
                reason: fault.message,
            });
        }
        Disposition::Teardown => {
            warn!(reason = %fault.message, "webservice hung up, tearing down server");
            state.supervisor.request(ShutdownRequest::Teardown {
                reason: fault.message,
            });
        }
    }

    response
}

/// Render `template`, falling back to a plain-text body if that fails.
fn render_status_page<V: Serialize>(
    state: &AppState,
    page: &PageContext,
    status: StatusCode,
    template: &str,
    view: &V,
) -> Response {
    match state.views.render(template, page, view) {
        Ok(html) => (status, html).into_response(),
        Err(e) => {
            error!(error = %e, template, "failed to render error page");
            (status, status.canonical_reason().unwrap_or_default()).into_response()
        }
    }
}

/// Convert a caught handler panic into a tagged failure response.
#[allow(clippy::needless_pass_by_value)]
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| (*s).to_owned()))
        .unwrap_or_else(|| "unknown panic".to_owned());
    DashboardError::Panic(message).into_response()
}
