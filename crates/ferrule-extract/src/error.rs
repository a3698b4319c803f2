//! Binding error types.
//!
//! A [`BindingError`] records where binding failed and why. Converting it
//! into an [`ApplicationError`] picks the status: request data that does not
//! fit the handler's parameters is the client's fault (400), while a handler
//! asking for a path parameter its route never declares is a wiring mistake
//! (500).

use ferrule_core::{ApplicationError, InnerError};
use std::fmt;
use thiserror::Error;

/// Where binding was reading from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// Path parameters (e.g., `/users/{id}`)
    Path,
    /// Query string parameters
    Query,
    /// The JSON request body
    Body,
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Body => write!(f, "body"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingErrorKind {
    /// Required data is absent
    Missing,
    /// Value has invalid type or format
    InvalidType,
    /// Structured conversion failed
    DeserializationFailed,
}

/// Error raised while binding request data onto handler parameters.
///
/// # Example
///
/// ```rust
/// use ferrule_extract::{BindingError, BindingSource};
///
/// let err = BindingError::missing(BindingSource::Body, "payload");
/// assert_eq!(err.binding_source(), BindingSource::Body);
/// assert_eq!(err.error_code(), "MISSING_PARAMETER");
/// assert!(err.to_string().contains("payload"));
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BindingError {
    binding_source: BindingSource,
    kind: BindingErrorKind,
    field: Option<String>,
    message: String,
}

impl BindingError {
    /// Creates an error for missing data.
    #[must_use]
    pub fn missing(source: BindingSource, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            binding_source: source,
            kind: BindingErrorKind::Missing,
            message: format!("missing required {source} data: {field}"),
            field: Some(field),
        }
    }

    /// Creates an error for a value of the wrong type or format.
    #[must_use]
    pub fn invalid_type(
        source: BindingSource,
        field: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let details = details.into();
        Self {
            binding_source: source,
            kind: BindingErrorKind::InvalidType,
            message: format!("invalid {source} parameter '{field}': {details}"),
            field: Some(field),
        }
    }

    /// Creates an error for a failed structured conversion.
    #[must_use]
    pub fn deserialization_failed(source: BindingSource, error: impl fmt::Display) -> Self {
        Self {
            binding_source: source,
            kind: BindingErrorKind::DeserializationFailed,
            message: format!("failed to deserialize {source}: {error}"),
            field: None,
        }
    }

    /// Where binding was reading from.
    #[must_use]
    pub fn binding_source(&self) -> BindingSource {
        self.binding_source
    }

    /// The field involved, if known.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Whether the data was absent rather than malformed.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.kind == BindingErrorKind::Missing
    }

    /// Returns the error code used in inner errors.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self.kind {
            BindingErrorKind::Missing => "MISSING_PARAMETER",
            BindingErrorKind::InvalidType => "INVALID_PARAMETER",
            BindingErrorKind::DeserializationFailed => "DESERIALIZATION_FAILED",
        }
    }

    fn to_inner(&self) -> InnerError {
        InnerError::new(self.error_code(), self.message.clone(), self.binding_source.to_string())
    }
}

/// Result type for binding.
pub type BindingResult<T> = Result<T, BindingError>;

impl From<BindingError> for ApplicationError {
    fn from(error: BindingError) -> Self {
        let message = match (error.binding_source, error.kind) {
            (BindingSource::Path, BindingErrorKind::Missing) => {
                let field = error.field().unwrap_or_default();
                return Self::configuration_with_source(
                    format!("endpoint requested path parameter `{field}` that its route does not declare"),
                    error,
                );
            }
            (BindingSource::Body, _) => "Missing or bad formatted required payload for the endpoint.",
            (BindingSource::Query, _) => {
                "Missing or bad formatted required query parameter for the endpoint."
            }
            (BindingSource::Path, _) => "Bad formatted path parameter for the endpoint.",
        };
        let inner = vec![error.to_inner()];
        Self::binding_with_source(message, inner, error)
    }
}
