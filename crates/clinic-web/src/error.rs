//! Error types for the portal.
//!
//! Errors are rendered as simple HTML error pages rather than JSON,
//! since every route serves a browser.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clinic_core::BackendError;
use maud::{DOCTYPE, PreEscaped, html};

use crate::render::components::PAGE_CSS;

/// Portal error type.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// The requested page or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request parameter could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The caller must sign in first.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller is signed in but not allowed here.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The backend actor failed or refused the call.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Internal server error (rendering, serialization, etc.).
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for handler results.
pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Backend(BackendError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            Self::Backend(BackendError::Rejected(_)) => StatusCode::BAD_REQUEST,
            Self::Backend(BackendError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (title, message) = match &self {
            Self::NotFound(what) => ("Not Found", format!("We couldn't find {what}.")),
            Self::BadRequest(msg) => ("Bad Request", msg.clone()),
            Self::Unauthorized => (
                "Sign In Required",
                "Please sign in to continue.".to_string(),
            ),
            Self::Forbidden(msg) => ("Access Denied", msg.clone()),
            Self::Backend(err) if err.is_authorization() => {
                tracing::warn!(error = %err, "backend refused caller");
                (
                    "Access Denied",
                    "You don't have permission to do that.".to_string(),
                )
            }
            Self::Backend(BackendError::Rejected(msg)) => ("Request Rejected", msg.clone()),
            Self::Backend(err) => {
                tracing::error!(error = %err, "backend error");
                (
                    "Service Unavailable",
                    "The clinic service is temporarily unavailable. Please try again later."
                        .to_string(),
                )
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    "Internal Error",
                    "An internal error occurred. Please try again later.".to_string(),
                )
            }
        };

        let markup = html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) }
                    meta name="robots" content="noindex";
                    style { (PreEscaped(PAGE_CSS)) }
                }
                body {
                    main {
                        div class="card narrow" {
                            h1 { (title) }
                            p class="muted" { (message) }
                            div class="actions" {
                                a class="btn outline" href="/" { "Back to Home" }
                            }
                        }
                    }
                }
            }
        };

        (status, markup).into_response()
    }
}
