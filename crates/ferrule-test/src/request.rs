//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use serde::Serialize;

/// Builder for a request sent through a [`TestClient`](crate::TestClient).
///
/// Invalid headers or bodies are remembered and reported by
/// [`build`](Self::build), so calls can be chained freely.
///
/// # Example
///
/// ```
/// use ferrule_test::TestRequestBuilder;
/// use http::Method;
///
/// let request = TestRequestBuilder::new(Method::GET, "/items/7")
///     .query("expand", "lines & totals")
///     .header("X-Tenant", "acme")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.uri().query(), Some("expand=lines%20%26%20totals"));
/// assert_eq!(request.headers()["x-tenant"], "acme");
/// ```
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Starts a request for `path`, which may carry its own query string.
    pub fn new(method: Method, path: impl AsRef<str>) -> Self {
        Self {
            method,
            path: path.as_ref().to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Appends a percent-encoded query parameter.
    pub fn query(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.query
            .push((name.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Adds a header. Repeated names are kept as separate values.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            (Err(e), _) => self.fail(TestError::InvalidHeader(e.to_string())),
            (_, Err(e)) => self.fail(TestError::InvalidHeader(e.to_string())),
        }
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the JSON body and sets `Content-Type`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Bytes::from(bytes);
                self.headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
            }
            Err(e) => self.fail(TestError::Json(e)),
        }
        self
    }

    /// Builds the transport request.
    ///
    /// # Errors
    ///
    /// Returns the first recorded header or body error, or
    /// [`TestError::RequestBuild`] for an invalid URI.
    pub fn build(self) -> Result<http::Request<Bytes>, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self.uri_string().parse().map_err(|e| {
            TestError::RequestBuild(format!("invalid URI `{}`: {e}", self.path))
        })?;

        let mut request = http::Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok(request)
    }

    fn uri_string(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let encoded = self
            .query
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.path.contains('?') { '&' } else { '?' };
        format!("{}{separator}{encoded}", self.path)
    }

    fn fail(&mut self, error: TestError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_request() {
        let request = TestRequestBuilder::new(Method::DELETE, "/orders/3")
            .build()
            .unwrap();
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.uri().path(), "/orders/3");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_query_appends_to_existing() {
        let request = TestRequestBuilder::new(Method::GET, "/search?page=2")
            .query("q", "a/b")
            .build()
            .unwrap();
        assert_eq!(request.uri().query(), Some("page=2&q=a%2Fb"));
    }

    #[test]
    fn test_json_sets_content_type() {
        let request = TestRequestBuilder::new(Method::POST, "/orders")
            .json(&json!({ "sku": "A-1" }))
            .build()
            .unwrap();
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(request.body().as_ref(), br#"{"sku":"A-1"}"#);
    }

    #[test]
    fn test_repeated_headers_kept() {
        let request = TestRequestBuilder::new(Method::GET, "/")
            .header("X-Trace", "a")
            .header("X-Trace", "b")
            .build()
            .unwrap();
        assert_eq!(request.headers().get_all("x-trace").iter().count(), 2);
    }

    #[test]
    fn test_invalid_header_reported_at_build() {
        let err = TestRequestBuilder::new(Method::GET, "/")
            .header("bad header", "x")
            .header("X-Ok", "y")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::InvalidHeader(_)));
    }

    #[test]
    fn test_invalid_uri() {
        let err = TestRequestBuilder::new(Method::GET, "not a uri")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::RequestBuild(_)));
    }
}
