//! The internal request model.
//!
//! The transport's raw request is adapted once into an [`InternalRequest`],
//! which is then the only request state the pipeline knows about. It is
//! passed by value from middleware to middleware and finally to the handler,
//! so whatever a middleware hands to its continuation is what everything
//! downstream sees.

use ferrule_router::normalize_path;
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate and sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// The authenticated user attached to a request by middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpUser {
    /// Stable user identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Login name.
    pub username: Option<String>,
    /// Bearer token the user authenticated with.
    pub token: Option<String>,
    /// API key the user authenticated with.
    pub api_key: Option<String>,
}

impl HttpUser {
    /// Identifier suitable for logs. Never includes credentials.
    #[must_use]
    pub fn log_id(&self) -> String {
        match (&self.id, &self.username) {
            (Some(id), _) => format!("user:{id}"),
            (None, Some(username)) => format!("user:{username}"),
            (None, None) if self.api_key.is_some() => "apikey".to_string(),
            _ => "anonymous".to_string(),
        }
    }
}

/// A normalized inbound request.
///
/// Header names are stored lower-cased, so [`header`](Self::header) lookups
/// are case-insensitive.
///
/// # Example
///
/// ```
/// use ferrule_core::InternalRequest;
/// use http::Method;
/// use serde_json::json;
///
/// let request = InternalRequest::new(Method::POST, "/Items/")
///     .with_query_param("verbose", "true")
///     .with_header("Content-Type", "application/json")
///     .with_body(json!({ "name": "widget" }));
///
/// assert_eq!(request.path(), "/Items");
/// assert_eq!(request.query_param("verbose"), Some("true"));
/// assert_eq!(request.header("content-type"), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct InternalRequest {
    id: RequestId,
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: Option<Value>,
    host: Option<String>,
    user: Option<HttpUser>,
}

impl InternalRequest {
    /// Creates a request with a fresh [`RequestId`].
    ///
    /// The path is normalized the same way the router normalizes it and
    /// always starts with `/`.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            id: RequestId::new(),
            method,
            path: format!("/{}", normalize_path(path)),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: None,
            host: None,
            user: None,
        }
    }

    /// Replaces the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Sets one query parameter.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Sets one header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets the parsed JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Attaches an authenticated user.
    #[must_use]
    pub fn with_user(mut self, user: HttpUser) -> Self {
        self.user = Some(user);
        self
    }

    /// Overrides the generated request id.
    #[must_use]
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = id;
        self
    }

    /// The request id.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The normalized path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All query parameters.
    #[must_use]
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// One query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Mutable query parameters.
    pub fn query_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.query
    }

    /// All headers, keyed by lower-cased name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Looks a header up case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Sets a header, replacing any previous value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Removes a header.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    /// The parsed JSON body, if one was sent and decoded.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: Option<Value>) {
        self.body = body;
    }

    /// The host the request was addressed to.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The authenticated user, if middleware attached one.
    #[must_use]
    pub fn user(&self) -> Option<&HttpUser> {
        self.user.as_ref()
    }

    /// Attaches or clears the authenticated user.
    pub fn set_user(&mut self, user: Option<HttpUser>) {
        self.user = user;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_is_unique() {
        let first = RequestId::new();
        let second = RequestId::new();
        assert_ne!(first, second);
        assert_eq!(first.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_path_is_normalized() {
        assert_eq!(InternalRequest::new(Method::GET, "users/7/").path(), "/users/7");
        assert_eq!(InternalRequest::new(Method::GET, "/").path(), "/");
        assert_eq!(InternalRequest::new(Method::GET, "\\a\\b").path(), "/a/b");
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut request = InternalRequest::new(Method::GET, "/").with_header("X-Api-Key", "k1");
        assert_eq!(request.header("x-api-key"), Some("k1"));
        assert_eq!(request.header("X-API-KEY"), Some("k1"));

        request.set_header("x-api-key", "k2");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.remove_header("X-Api-Key"), Some("k2".to_string()));
    }

    #[test]
    fn test_body_and_query_mutation() {
        let mut request = InternalRequest::new(Method::POST, "/items")
            .with_body(json!({"a": 1}))
            .with_query_param("page", "1");

        request.query_mut().insert("page".into(), "2".into());
        request.set_body(None);

        assert_eq!(request.query_param("page"), Some("2"));
        assert!(request.body().is_none());
    }

    #[test]
    fn test_user_log_id() {
        let user = HttpUser {
            id: Some("42".into()),
            token: Some("secret".into()),
            ..HttpUser::default()
        };
        assert_eq!(user.log_id(), "user:42");

        let key_only = HttpUser {
            api_key: Some("k".into()),
            ..HttpUser::default()
        };
        assert_eq!(key_only.log_id(), "apikey");
        assert_eq!(HttpUser::default().log_id(), "anonymous");
    }

    #[test]
    fn test_user_attachment() {
        let mut request = InternalRequest::new(Method::GET, "/me");
        assert!(request.user().is_none());
        request.set_user(Some(HttpUser {
            username: Some("ada".into()),
            ..HttpUser::default()
        }));
        assert_eq!(request.user().unwrap().username.as_deref(), Some("ada"));
    }
}
