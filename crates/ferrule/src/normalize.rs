//! Adapting transport requests into [`InternalRequest`]s.

use bytes::Bytes;
use ferrule_core::InternalRequest;
use http::header::HOST;
use http::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;

/// Builds an [`InternalRequest`] from a transport request.
///
/// - The query string is form-decoded; for repeated keys the last value
///   wins. An undecodable query string yields no parameters.
/// - The body is parsed as JSON on a best-effort basis: an empty or
///   invalid body becomes absent.
/// - Header names are lower-cased and repeated headers are joined with
///   `", "`. Values that are not visible ASCII are skipped.
/// - The host comes from the URI authority, else the `Host` header.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use ferrule::normalize;
///
/// let request = http::Request::post("http://shop.local/Items/?verbose=true&verbose=false")
///     .header("X-Trace", "a")
///     .header("X-Trace", "b")
///     .body(Bytes::from_static(br#"{"name":"widget"}"#))
///     .unwrap();
///
/// let internal = normalize(request);
/// assert_eq!(internal.path(), "/Items");
/// assert_eq!(internal.query_param("verbose"), Some("false"));
/// assert_eq!(internal.header("x-trace"), Some("a, b"));
/// assert_eq!(internal.host(), Some("shop.local"));
/// assert_eq!(internal.body().unwrap()["name"], "widget");
/// ```
#[must_use]
pub fn normalize(request: http::Request<Bytes>) -> InternalRequest {
    let (parts, body) = request.into_parts();

    let mut internal = InternalRequest::new(parts.method, parts.uri.path())
        .with_query(decode_query(parts.uri.query()));

    for (name, value) in join_headers(&parts.headers) {
        internal.set_header(&name, value);
    }

    let host = parts
        .uri
        .host()
        .map(str::to_owned)
        .or_else(|| internal.header(HOST.as_str()).map(str::to_owned));
    if let Some(host) = host {
        internal = internal.with_host(host);
    }

    internal.set_body(decode_body(&body));
    internal
}

fn decode_query(query: Option<&str>) -> HashMap<String, String> {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return HashMap::new();
    };
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(err) => {
            tracing::debug!(error = %err, "discarding undecodable query string");
            HashMap::new()
        }
    }
}

fn join_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .keys()
        .map(|name| {
            let joined = headers
                .get_all(name)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            (name.as_str().to_owned(), joined)
        })
        .collect()
}

fn decode_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "discarding undecodable request body");
            None
        }
    }
}
