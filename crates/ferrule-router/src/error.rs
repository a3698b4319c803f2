//! Router error types.

use crate::RouteMethod;
use http::StatusCode;
use thiserror::Error;

/// Errors raised while registering or resolving routes.
///
/// Registration errors are configuration mistakes and surface at startup.
/// Resolution errors are per request and carry an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A handler is already bound to this method and path.
    #[error("route {method} {path} already has a handler bound")]
    DuplicateRoute {
        /// Method of the rejected registration.
        method: RouteMethod,
        /// Template of the rejected registration.
        path: String,
    },

    /// The template has an empty segment between two non-empty ones.
    #[error("it is not possible to add an empty path part to an endpoint: `{path}`")]
    EmptySegment {
        /// The offending template.
        path: String,
    },

    /// The method does not accept route registrations.
    #[error("routes cannot be registered for method {method}")]
    MethodNotRoutable {
        /// The rejected method.
        method: RouteMethod,
    },

    /// No endpoint is bound for this method and path.
    #[error("endpoint was not found for {method} {path}")]
    NotFound {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// The request path has an empty segment mid-walk.
    #[error("unprocessable URL part in `{path}`")]
    MalformedPath {
        /// Request path.
        path: String,
    },
}

impl RouteError {
    /// Returns true for errors raised while building the route table.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRoute { .. } | Self::EmptySegment { .. } | Self::MethodNotRoutable { .. }
        )
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MalformedPath { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
