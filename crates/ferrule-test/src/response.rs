//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use ferrule_core::{ErrorBody, ResponseEnvelope};
use http::{header, HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A buffered response with assertion helpers.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Buffers a transport response.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::BodyRead`] if the body cannot be collected.
    pub async fn from_http<B>(response: http::Response<B>) -> Result<Self, TestError>
    where
        B: http_body_util::BodyExt,
        B::Error: fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TestError::BodyRead(e.to_string()))?
            .to_bytes();

        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// Creates a response from raw parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The status code as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// The response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value, if present and valid text.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns true if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// The body as text.
    ///
    /// # Errors
    ///
    /// Fails if the body is not UTF-8.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the whole body.
    ///
    /// # Errors
    ///
    /// Fails if the body is not JSON of shape `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The `{ data, errors, isError }` envelope.
    ///
    /// # Errors
    ///
    /// Fails if the body is not an envelope. An empty body is not.
    pub fn envelope(&self) -> Result<ResponseEnvelope, TestError> {
        self.json()
    }

    /// The envelope's `data`, deserialized.
    ///
    /// # Errors
    ///
    /// Fails if the body is not an envelope or `data` is not a `T`.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        let data = self.envelope()?.data.unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    /// The envelope's error details, if the envelope is an error.
    ///
    /// # Errors
    ///
    /// Fails if the body is not an envelope.
    pub fn errors(&self) -> Result<Option<ErrorBody>, TestError> {
        Ok(self.envelope()?.errors)
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {} with body {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts an error envelope with the given code.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an error envelope carrying `code`.
    pub fn assert_error_code(&self, code: &str) -> &Self {
        let envelope = self
            .envelope()
            .unwrap_or_else(|e| panic!("body is not an envelope: {e}"));
        assert!(envelope.is_error, "expected an error envelope, got {envelope:?}");
        let actual = envelope.errors.map(|e| e.code).unwrap_or_default();
        assert_eq!(actual, code, "error code mismatch");
        self
    }

    /// Asserts the envelope's `data`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not an envelope or `data` differs.
    pub fn assert_data(&self, expected: &Value) -> &Self {
        let actual: Value = self
            .data()
            .unwrap_or_else(|e| panic!("body is not an envelope: {e}"));
        assert_eq!(&actual, expected, "envelope data mismatch");
        self
    }

    /// Asserts an empty body.
    ///
    /// # Panics
    ///
    /// Panics if the body is not empty.
    pub fn assert_empty(&self) -> &Self {
        assert!(
            self.body.is_empty(),
            "expected an empty body, got {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts that `Content-Type` starts with `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_content_type(&self, expected: &str) -> &Self {
        let actual = self
            .header_str(header::CONTENT_TYPE.as_str())
            .unwrap_or_else(|| panic!("Content-Type header not found"));
        assert!(
            actual.starts_with(expected),
            "Content-Type: expected '{expected}', got '{actual}'"
        );
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_core::{ApplicationError, Response};
    use serde_json::json;

    async fn buffered(response: Response) -> TestResponse {
        TestResponse::from_http(response.into_http()).await.unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = buffered(Response::json(&json!({ "id": 4 })).unwrap()).await;
        response
            .assert_status(StatusCode::OK)
            .assert_content_type("application/json")
            .assert_data(&json!({ "id": 4 }));

        let envelope = response.envelope().unwrap();
        assert!(!envelope.is_error);
        assert!(response.errors().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let response = buffered(ApplicationError::not_found("no such order").into()).await;
        response
            .assert_status(StatusCode::NOT_FOUND)
            .assert_error_code("ROUTE_NOT_FOUND");

        let errors = response.errors().unwrap().unwrap();
        assert_eq!(errors.message, "no such order");
        assert_eq!(errors.status, 404);
    }

    #[tokio::test]
    async fn test_empty_success() {
        let response = buffered(Response::ok()).await;
        response.assert_status(StatusCode::OK).assert_empty();
        assert!(response.envelope().is_err());
    }

    #[test]
    fn test_text_and_json() {
        let response = TestResponse::new(
            StatusCode::CREATED,
            HeaderMap::new(),
            Bytes::from_static(br#"{"n":1}"#),
        );
        assert_eq!(response.status_code(), 201);
        assert_eq!(response.text().unwrap(), r#"{"n":1}"#);
        assert_eq!(response.json::<Value>().unwrap()["n"], 1);
    }
}
