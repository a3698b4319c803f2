//! HTTP methods known to the route trie.
//!
//! Every [`RouteMethod`] owns one root node in the trie. Only the five
//! resource methods accept registrations; the remaining roots exist so that
//! resolution against them fails cleanly as "not found".

use http::Method;
use std::fmt;

/// An HTTP method with its own route root.
///
/// # Example
///
/// ```rust
/// use ferrule_router::RouteMethod;
/// use http::Method;
///
/// assert_eq!(RouteMethod::from_http(&Method::PATCH), Some(RouteMethod::Patch));
/// assert!(RouteMethod::Patch.is_registrable());
/// assert!(!RouteMethod::Head.is_registrable());
/// assert_eq!(RouteMethod::from_http(&Method::from_bytes(b"PROPFIND").unwrap()), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `CONNECT`
    Connect,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
    /// `HEAD`
    Head,
}

impl RouteMethod {
    /// All methods, in root order.
    pub const ALL: [RouteMethod; 9] = [
        RouteMethod::Get,
        RouteMethod::Post,
        RouteMethod::Put,
        RouteMethod::Patch,
        RouteMethod::Delete,
        RouteMethod::Connect,
        RouteMethod::Options,
        RouteMethod::Trace,
        RouteMethod::Head,
    ];

    /// Maps an [`http::Method`] onto a route root, if it has one.
    #[must_use]
    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::PATCH => Some(Self::Patch),
            Method::DELETE => Some(Self::Delete),
            Method::CONNECT => Some(Self::Connect),
            Method::OPTIONS => Some(Self::Options),
            Method::TRACE => Some(Self::Trace),
            Method::HEAD => Some(Self::Head),
            _ => None,
        }
    }

    /// Returns true if routes may be registered under this method.
    #[must_use]
    pub fn is_registrable(self) -> bool {
        matches!(
            self,
            Self::Get | Self::Post | Self::Put | Self::Patch | Self::Delete
        )
    }

    /// The canonical upper-case method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Connect => "CONNECT",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
            Self::Head => "HEAD",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RouteMethod> for Method {
    fn from(method: RouteMethod) -> Self {
        match method {
            RouteMethod::Get => Method::GET,
            RouteMethod::Post => Method::POST,
            RouteMethod::Put => Method::PUT,
            RouteMethod::Patch => Method::PATCH,
            RouteMethod::Delete => Method::DELETE,
            RouteMethod::Connect => Method::CONNECT,
            RouteMethod::Options => Method::OPTIONS,
            RouteMethod::Trace => Method::TRACE,
            RouteMethod::Head => Method::HEAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_http() {
        for method in RouteMethod::ALL {
            let http_method: Method = method.into();
            assert_eq!(RouteMethod::from_http(&http_method), Some(method));
            assert_eq!(http_method.as_str(), method.as_str());
        }
    }

    #[test]
    fn test_indices_are_dense() {
        for (i, method) in RouteMethod::ALL.iter().enumerate() {
            assert_eq!(method.index(), i);
        }
    }

    #[test]
    fn test_registrable_methods() {
        let registrable: Vec<_> = RouteMethod::ALL
            .into_iter()
            .filter(|m| m.is_registrable())
            .collect();
        assert_eq!(
            registrable,
            vec![
                RouteMethod::Get,
                RouteMethod::Post,
                RouteMethod::Put,
                RouteMethod::Patch,
                RouteMethod::Delete
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(RouteMethod::Delete.to_string(), "DELETE");
    }
}
