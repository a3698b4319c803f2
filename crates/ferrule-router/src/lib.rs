//! Path-segment trie router for Ferrule.
//!
//! Routes are registered once at startup into a trie with one root per HTTP
//! method, then resolved concurrently from any number of requests. Nodes are
//! stored in an arena and addressed by [`NodeId`], so the finished router is
//! plain read-only data.
//!
//! # Features
//!
//! - **Literal and parameter segments**: `/users/{id}/posts`
//! - **Case folding**: literals and captured values are lower-cased
//! - **Backtracking**: parameter siblings are tried in registration order
//! - **Typed payloads**: the router is generic over the handler value `H`
//!   and the middleware value `M` bound to each route
//!
//! # Example
//!
//! ```rust
//! use ferrule_router::{Router, RouteError};
//! use http::Method;
//!
//! let mut router: Router<&str, &str> = Router::new();
//!
//! router.get("/users", "listUsers", []).unwrap();
//! router.get("/users/{id}", "getUser", ["auth"]).unwrap();
//!
//! let matched = router.resolve(&Method::GET, "/users/123").unwrap();
//! assert_eq!(*matched.handler, "getUser");
//! assert_eq!(matched.params.get("id"), Some("123"));
//! assert_eq!(matched.middleware, &["auth"]);
//!
//! assert!(matches!(
//!     router.resolve(&Method::GET, "/posts"),
//!     Err(RouteError::NotFound { .. })
//! ));
//! ```
//!
//! # Architecture
//!
//! ```text
//!        GET root           POST root ...
//!            │
//!         "users"          (literal children)
//!        ┌───┴────┐
//!      "me"     {id}       (parameter children, ordered)
//!    [handler] [handler]
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method;
mod node;
mod params;
mod router;
mod segment;

pub use error::{RouteError, RouteResult};
pub use method::RouteMethod;
pub use node::{Node, NodeId};
pub use params::Params;
pub use router::Router;
pub use segment::{normalize_path, Segment};

/// The result of a successful resolution.
///
/// Borrowed from the router; owned parameters are captured fresh per call.
#[derive(Debug, PartialEq, Eq)]
pub struct RouteMatch<'a, H, M = ()> {
    /// The handler bound to the matched route.
    pub handler: &'a H,
    /// Captured path parameters.
    pub params: Params,
    /// Route middleware, in declaration order.
    pub middleware: &'a [M],
}

impl<'a, H, M> RouteMatch<'a, H, M> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(handler: &'a H, params: Params, middleware: &'a [M]) -> Self {
        Self {
            handler,
            params,
            middleware,
        }
    }
}

impl<H, M> Clone for RouteMatch<'_, H, M> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler,
            params: self.params.clone(),
            middleware: self.middleware,
        }
    }
}
