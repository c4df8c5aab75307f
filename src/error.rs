//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Page handlers use the narrower [`PageError`], which the scheme
//! dispatcher translates into [`GatewayError`] variants.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "no handler found for lumen://bogus",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error kind a page handler can signal explicitly.
///
/// Handlers use this to draw distinctions the dispatcher could not infer
/// from a plain I/O failure, e.g. a missing sub-resource versus a request
/// the handler refuses to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageErrorKind {
    /// The requested resource does not exist.
    NotFound,
    /// The handler refuses to serve the request.
    Denied,
    /// The handler failed for a reason other than a missing resource.
    Failed,
}

/// Error type returned by page handlers.
///
/// The dispatcher maps `Io` to a not-found response (logging the cause)
/// and passes `Structured` through with its exact kind and message.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// Recoverable I/O failure while producing the page.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Explicit handler error with a kind and message.
    #[error("{message}")]
    Structured {
        /// Error classification, preserved end to end.
        kind: PageErrorKind,
        /// Human-readable message.
        message: String,
    },
}

impl PageError {
    /// Builds a structured not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Structured {
            kind: PageErrorKind::NotFound,
            message: message.into(),
        }
    }

    /// Builds a structured denied error.
    #[must_use]
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Structured {
            kind: PageErrorKind::Denied,
            message: message.into(),
        }
    }

    /// Builds a structured failure for errors that are neither a missing
    /// resource nor a refusal.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Structured {
            kind: PageErrorKind::Failed,
            message: message.into(),
        }
    }
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status               |
/// |-----------|-------------------|---------------------------|
/// | 2000–2999 | Not Found         | 403 / 404                 |
/// | 3000–3999 | Server / Startup  | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No page handler resolves for the request path or host.
    #[error("no handler found for {0}")]
    NoHandler(String),

    /// A page handler hit a recoverable I/O failure; surfaced to the
    /// caller as not-found.
    #[error("{0}")]
    PageIo(String),

    /// A page handler raised a structured error; kind and message are
    /// passed through unchanged.
    #[error("{message}")]
    Page {
        /// Error classification from the handler.
        kind: PageErrorKind,
        /// Handler-supplied message.
        message: String,
    },

    /// A page name was registered twice. Startup configuration error.
    #[error("page handler {0} already registered")]
    DuplicatePage(String),

    /// A saveable name was registered twice. Startup configuration error.
    #[error("saveable {0} already registered")]
    DuplicateSaveable(String),

    /// No saveable with the given name exists.
    #[error("{0} is nothing which can be saved")]
    UnknownSaveable(String),

    /// Persisting a saveable failed.
    #[error("could not save {name}: {cause}")]
    SaveFailed {
        /// Name of the saveable that failed to persist.
        name: String,
        /// Underlying I/O failure.
        #[source]
        cause: std::io::Error,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::NoHandler(_) => 2001,
            Self::PageIo(_) => 2002,
            Self::Page { kind, .. } => match kind {
                PageErrorKind::NotFound => 2003,
                PageErrorKind::Denied => 2004,
                PageErrorKind::Failed => 3002,
            },
            Self::UnknownSaveable(_) => 2005,
            Self::DuplicatePage(_) => 3003,
            Self::DuplicateSaveable(_) => 3004,
            Self::SaveFailed { .. } => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NoHandler(_) | Self::PageIo(_) | Self::UnknownSaveable(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Page { kind, .. } => match kind {
                PageErrorKind::NotFound => StatusCode::NOT_FOUND,
                PageErrorKind::Denied => StatusCode::FORBIDDEN,
                PageErrorKind::Failed => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::DuplicatePage(_)
            | Self::DuplicateSaveable(_)
            | Self::SaveFailed { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn no_handler_maps_to_not_found() {
        let err = GatewayError::NoHandler("lumen://bogus".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
        assert!(err.to_string().contains("lumen://bogus"));
    }

    #[test]
    fn page_error_kind_drives_status() {
        let not_found = GatewayError::Page {
            kind: PageErrorKind::NotFound,
            message: "missing".to_string(),
        };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let denied = GatewayError::Page {
            kind: PageErrorKind::Denied,
            message: "nope".to_string(),
        };
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

        let failed = GatewayError::Page {
            kind: PageErrorKind::Failed,
            message: "broken".to_string(),
        };
        assert_eq!(failed.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn page_error_constructors_set_their_kind() {
        for (err, expected) in [
            (PageError::not_found("gone"), PageErrorKind::NotFound),
            (PageError::denied("nope"), PageErrorKind::Denied),
            (PageError::failed("broken"), PageErrorKind::Failed),
        ] {
            let PageError::Structured { kind, .. } = err else {
                panic!("constructor built a non-structured error");
            };
            assert_eq!(kind, expected);
        }
    }

    #[test]
    fn save_failed_names_resource_and_cause() {
        let err = GatewayError::SaveFailed {
            name: "cookies".to_string(),
            cause: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only fs"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cookies"));
        assert!(msg.contains("read-only fs"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_saveable_message_matches_command_surface() {
        let err = GatewayError::UnknownSaveable("bookmarks".to_string());
        assert_eq!(err.to_string(), "bookmarks is nothing which can be saved");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
