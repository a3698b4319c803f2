//! Responses and the wire envelope.
//!
//! Handlers and short-circuiting middleware produce a [`Response`]. The
//! transport writes it out as an `{ data, errors, isError }` JSON envelope;
//! a successful response without data is written with an empty body.

use crate::error::{ApplicationError, InnerError};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON envelope every response body is wrapped in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Handler payload, `null` on error.
    pub data: Option<Value>,
    /// Error details, `null` on success.
    pub errors: Option<ErrorBody>,
    /// Whether this envelope describes a failure.
    pub is_error: bool,
}

impl ResponseEnvelope {
    /// A successful envelope.
    #[must_use]
    pub fn success(data: Option<Value>) -> Self {
        Self {
            data,
            errors: None,
            is_error: false,
        }
    }

    /// A failed envelope.
    #[must_use]
    pub fn failure(errors: ErrorBody) -> Self {
        Self {
            data: None,
            errors: Some(errors),
            is_error: true,
        }
    }
}

/// Error details inside a [`ResponseEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code.
    pub status: u16,
    /// Diagnostic chain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inner: Vec<InnerError>,
}

/// A response produced by a handler or a short-circuiting middleware.
///
/// # Example
///
/// ```
/// use ferrule_core::Response;
/// use http::StatusCode;
/// use serde_json::json;
///
/// let response = Response::json(&json!({ "id": 7 })).unwrap();
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.data().unwrap()["id"], 7);
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    data: Option<Value>,
    error: Option<ErrorBody>,
    headers: HeaderMap,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl Response {
    /// An empty response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            data: None,
            error: None,
            headers: HeaderMap::new(),
        }
    }

    /// An empty `200 OK`.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// A `200 OK` carrying serialized data.
    pub fn json<T: Serialize + ?Sized>(data: &T) -> Result<Self, ApplicationError> {
        let value = serde_json::to_value(data).map_err(|e| {
            ApplicationError::internal_with_source("failed to serialize response data", e)
        })?;
        Ok(Self::ok().with_data(value))
    }

    /// An error response rendered from an [`ApplicationError`].
    #[must_use]
    pub fn from_error(error: &ApplicationError) -> Self {
        Self {
            status: error.status_code(),
            data: None,
            error: Some(error.to_body()),
            headers: HeaderMap::new(),
        }
    }

    /// Replaces the data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Replaces the status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The data, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// The error body, if this is an error response.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorBody> {
        self.error.as_ref()
    }

    /// Whether this is an error response.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The envelope this response serializes to.
    #[must_use]
    pub fn envelope(&self) -> ResponseEnvelope {
        match &self.error {
            Some(error) => ResponseEnvelope::failure(error.clone()),
            None => ResponseEnvelope::success(self.data.clone()),
        }
    }

    /// Converts into an `http` response with a JSON envelope body.
    #[must_use]
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let has_body = self.error.is_some() || self.data.is_some();
        let body = if has_body {
            serde_json::to_vec(&self.envelope())
                .map(Bytes::from)
                .unwrap_or_default()
        } else {
            Bytes::new()
        };

        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if has_body {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        response
    }
}

impl From<ApplicationError> for Response {
    fn from(error: ApplicationError) -> Self {
        Self::from_error(&error)
    }
}
