//! Error types for route handlers.
//!
//! Handlers return [`DashboardError`] and never render failure pages
//! themselves. [`IntoResponse`] only sets the status and attaches the error
//! as a [`RouteFailure`] extension; the fault middleware in
//! [`crate::fault`] picks it up and renders the 404 or 500 view.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pa11y_client::ClientError;

/// Errors that can occur while handling a dashboard request.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The webservice call failed.
    #[error(transparent)]
    Webservice(#[from] ClientError),

    /// The requested task or result does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A view model could not be serialized into template locals.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A template failed to render.
    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),

    /// A handler panicked.
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl DashboardError {
    /// Map a webservice lookup failure, turning "no such resource" into
    /// [`DashboardError::NotFound`].
    pub fn lookup(error: ClientError, what: impl Into<String>) -> Self {
        if error.is_not_found() {
            Self::NotFound(what.into())
        } else {
            Self::Webservice(error)
        }
    }

    /// The status the failure page is served with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Response extension carrying a handler failure to the fault middleware.
#[derive(Debug, Clone)]
pub struct RouteFailure(pub Arc<DashboardError>);

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response
            .extensions_mut()
            .insert(RouteFailure(Arc::new(self)));
        response
    }
}
