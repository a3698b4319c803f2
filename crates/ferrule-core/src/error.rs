//! Error types for Ferrule.
//!
//! [`ApplicationError`] is the error every request-facing part of the runtime
//! converges on. It knows its HTTP status, a machine-readable code and the
//! chain of inner errors that led to it, and renders itself into the
//! `{ data, errors, isError }` envelope.
//!
//! | Category | Raised by | Status |
//! |---|---|---|
//! | `Configuration` | route table, DI container | 500 |
//! | `Routing` | route resolution | 404 / 400 |
//! | `Binding` | payload/query/path binding | 400 |
//! | `Handler` | application code | any |

use crate::di::DiError;
use crate::response::{ErrorBody, ResponseEnvelope};
use ferrule_router::RouteError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApplicationError`].
pub type AppResult<T> = Result<T, ApplicationError>;

/// Broad classification of an [`ApplicationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Startup or wiring mistakes: duplicate routes, unresolvable services.
    Configuration,
    /// The request did not resolve to a route.
    Routing,
    /// Request data could not be bound onto handler parameters.
    Binding,
    /// Raised by application code.
    Handler,
}

impl ErrorCategory {
    /// Returns true if the error should stop request handling outright.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration)
    }
}

/// One link of an error's diagnostic chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerError {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Where the error came from (`body`, `query`, `container`, ...).
    pub origin: String,
}

impl InnerError {
    /// Creates an inner error.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            origin: origin.into(),
        }
    }

    /// Flattens an error and its sources into inner errors.
    #[must_use]
    pub fn chain(error: &anyhow::Error, code: &str, origin: &str) -> Vec<Self> {
        error
            .chain()
            .map(|cause| Self::new(code, cause.to_string(), origin))
            .collect()
    }
}

/// Standard error type for Ferrule.
///
/// # Example
///
/// ```
/// use ferrule_core::{ApplicationError, ErrorCategory};
/// use http::StatusCode;
///
/// let error = ApplicationError::status(StatusCode::CONFLICT, "ORDER_LOCKED", "order is locked");
/// assert_eq!(error.category(), ErrorCategory::Handler);
/// assert_eq!(error.status_code(), StatusCode::CONFLICT);
///
/// let envelope = error.to_envelope();
/// assert!(envelope.is_error);
/// ```
#[derive(Error, Debug)]
pub enum ApplicationError {
    /// Wiring mistake discovered at startup or first use.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// No endpoint matched the request.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// The request path could not be processed.
    #[error("{message}")]
    MalformedPath {
        /// Human-readable error message.
        message: String,
    },

    /// Request data could not be bound onto the handler's parameters.
    #[error("{message}")]
    Binding {
        /// Human-readable error message.
        message: String,
        /// Conversion failures, outermost first.
        inner: Vec<InnerError>,
        /// The original conversion failure.
        #[source]
        source: Option<anyhow::Error>,
    },

    /// An error with a status and code chosen by application code.
    #[error("{message}")]
    Status {
        /// HTTP status to respond with.
        status: StatusCode,
        /// Machine-readable code.
        code: String,
        /// Human-readable error message.
        message: String,
    },

    /// Unexpected failure inside application code.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ApplicationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error wrapping its cause.
    pub fn configuration_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a malformed path error.
    #[must_use]
    pub fn malformed_path(message: impl Into<String>) -> Self {
        Self::MalformedPath {
            message: message.into(),
        }
    }

    /// Creates a binding error.
    #[must_use]
    pub fn binding(message: impl Into<String>, inner: Vec<InnerError>) -> Self {
        Self::Binding {
            message: message.into(),
            inner,
            source: None,
        }
    }

    /// Creates a binding error wrapping the original conversion failure.
    pub fn binding_with_source(
        message: impl Into<String>,
        inner: Vec<InnerError>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Binding {
            message: message.into(),
            inner,
            source: Some(source.into()),
        }
    }

    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn status(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::NotFound { .. } | Self::MalformedPath { .. } => ErrorCategory::Routing,
            Self::Binding { .. } => ErrorCategory::Binding,
            Self::Status { .. } | Self::Internal { .. } => ErrorCategory::Handler,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MalformedPath { .. } | Self::Binding { .. } => StatusCode::BAD_REQUEST,
            Self::Status { status, .. } => *status,
            Self::Configuration { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "ROUTE_NOT_FOUND",
            Self::MalformedPath { .. } => "MALFORMED_PATH",
            Self::Binding { .. } => "BINDING_FAILED",
            Self::Status { code, .. } => code.as_str(),
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// The bare message, without the category prefix used by `Display`.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::NotFound { message }
            | Self::MalformedPath { message }
            | Self::Binding { message, .. }
            | Self::Status { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    /// The diagnostic chain of inner errors.
    #[must_use]
    pub fn inner_errors(&self) -> Vec<InnerError> {
        match self {
            Self::Binding { inner, .. } => inner.clone(),
            Self::Configuration {
                source: Some(source),
                ..
            } => InnerError::chain(source, "CONFIGURATION_ERROR", "container"),
            Self::Internal {
                source: Some(source),
                ..
            } => InnerError::chain(source, "INTERNAL_ERROR", "handler"),
            _ => Vec::new(),
        }
    }

    /// Converts this error to the serializable response envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ResponseEnvelope {
        ResponseEnvelope::failure(self.to_body())
    }

    /// The `errors` member of the envelope.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.error_code().to_string(),
            message: self.message().to_string(),
            status: self.status_code().as_u16(),
            inner: self.inner_errors(),
        }
    }
}

impl From<RouteError> for ApplicationError {
    fn from(error: RouteError) -> Self {
        match error {
            RouteError::NotFound { .. } => Self::not_found(error.to_string()),
            RouteError::MalformedPath { .. } => Self::malformed_path(error.to_string()),
            _ => Self::configuration_with_source(error.to_string(), error),
        }
    }
}

impl From<DiError> for ApplicationError {
    fn from(error: DiError) -> Self {
        Self::configuration_with_source(error.to_string(), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_router::RouteMethod;

    #[test]
    fn test_not_found_from_route_error() {
        let error: ApplicationError = RouteError::NotFound {
            method: "GET".into(),
            path: "/missing".into(),
        }
        .into();
        assert_eq!(error.category(), ErrorCategory::Routing);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.error_code(), "ROUTE_NOT_FOUND");
    }

    #[test]
    fn test_malformed_path_from_route_error() {
        let error: ApplicationError = RouteError::MalformedPath {
            path: "/a//b".into(),
        }
        .into();
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.error_code(), "MALFORMED_PATH");
    }

    #[test]
    fn test_duplicate_route_is_configuration() {
        let error: ApplicationError = RouteError::DuplicateRoute {
            method: RouteMethod::Get,
            path: "/x".into(),
        }
        .into();
        assert_eq!(error.category(), ErrorCategory::Configuration);
        assert!(error.category().is_fatal());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.inner_errors().len(), 1);
    }

    #[test]
    fn test_di_error_is_configuration() {
        let error: ApplicationError = DiError::NotBound {
            type_name: "app::Clock",
        }
        .into();
        assert_eq!(error.category(), ErrorCategory::Configuration);
        assert!(error.message().contains("app::Clock"));
        let inner = error.inner_errors();
        assert_eq!(inner[0].origin, "container");
    }

    #[test]
    fn test_binding_error_carries_inner_chain() {
        let error = ApplicationError::binding(
            "Missing or bad formatted required payload for the endpoint.",
            vec![InnerError::new("MISSING_FIELD", "missing field `a`", "body")],
        );
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        let body = error.to_body();
        assert_eq!(body.inner.len(), 1);
        assert_eq!(body.inner[0].origin, "body");
    }

    #[test]
    fn test_internal_with_source_chain() {
        let root = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let error = ApplicationError::internal_with_source("could not save", root);
        assert_eq!(error.category(), ErrorCategory::Handler);
        let inner = error.inner_errors();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner[0].message, "disk full");
    }

    #[test]
    fn test_status_error_keeps_code() {
        let error = ApplicationError::status(StatusCode::UNAUTHORIZED, "NO_TOKEN", "token missing");
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(error.error_code(), "NO_TOKEN");
        assert_eq!(error.to_string(), "token missing");
    }

    #[test]
    fn test_envelope_serialization() {
        let error = ApplicationError::not_found("Endpoint was not found.");
        let json = serde_json::to_value(error.to_envelope()).unwrap();

        assert_eq!(json["isError"], true);
        assert!(json["data"].is_null());
        assert_eq!(json["errors"]["code"], "ROUTE_NOT_FOUND");
        assert_eq!(json["errors"]["status"], 404);
        assert_eq!(json["errors"]["message"], "Endpoint was not found.");
    }
}
