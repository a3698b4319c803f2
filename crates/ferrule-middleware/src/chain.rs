//! Ordered middleware chains.
//!
//! The pipeline assembles one chain per request: global middleware in
//! registration order, then the route's middleware in declaration order.
//! The chain is built back to front around the endpoint, so the first
//! middleware pushed is the first to see the request.

use crate::flow::Flow;
use crate::middleware::{BoxFuture, Middleware, Next};
use ferrule_core::{ApplicationError, InternalRequest, Response};
use std::sync::Arc;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered list of middleware wrapped around an endpoint.
///
/// # Example
///
/// ```
/// use ferrule_core::{InternalRequest, Response};
/// use ferrule_middleware::{before, MiddlewareChain, Step};
/// use http::Method;
/// use std::sync::Arc;
///
/// let mut chain = MiddlewareChain::new();
/// chain.push(Arc::new(before("stamp", |mut request: InternalRequest| {
///     request.set_header("x-stamped", "1");
///     Ok(Step::Continue(request))
/// })));
///
/// let flow = tokio_test::block_on(chain.run(
///     InternalRequest::new(Method::GET, "/"),
///     |request| Box::pin(async move {
///         assert_eq!(request.header("x-stamped"), Some("1"));
///         Ok(Response::ok())
///     }),
/// ))
/// .unwrap();
/// assert!(flow.is_completed());
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<BoxedMiddleware>,
}

impl MiddlewareChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty chain with room for `capacity` middleware.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stages: Vec::with_capacity(capacity),
        }
    }

    /// Appends a middleware.
    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.stages.push(middleware);
    }

    /// Runs the request through every middleware and then `endpoint`.
    pub async fn run<'a, F>(
        &'a self,
        request: InternalRequest,
        endpoint: F,
    ) -> Result<Flow, ApplicationError>
    where
        F: FnOnce(InternalRequest) -> BoxFuture<'a, Result<Response, ApplicationError>> + Send + 'a,
    {
        self.build_chain(endpoint).run(request).await
    }

    fn build_chain<'a, F>(&'a self, endpoint: F) -> Next<'a>
    where
        F: FnOnce(InternalRequest) -> BoxFuture<'a, Result<Response, ApplicationError>> + Send + 'a,
    {
        let mut next = Next::endpoint(endpoint);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Middleware names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    /// Number of middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain goes straight to the endpoint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Extend<BoxedMiddleware> for MiddlewareChain {
    fn extend<I: IntoIterator<Item = BoxedMiddleware>>(&mut self, iter: I) {
        self.stages.extend(iter);
    }
}

impl FromIterator<BoxedMiddleware> for MiddlewareChain {
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("stages", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{before, Step};
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn test_empty_chain_runs_endpoint() {
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());

        let flow = chain
            .run(InternalRequest::new(Method::GET, "/"), |_| {
                Box::pin(async { Ok(Response::new(StatusCode::ACCEPTED)) })
            })
            .await
            .unwrap();
        assert_eq!(flow.into_response().status(), StatusCode::ACCEPTED);
    }

    #[test]
    fn test_names_in_order() {
        let chain: MiddlewareChain = vec![
            Arc::new(before("a", |r| Ok(Step::Continue(r)))) as BoxedMiddleware,
            Arc::new(before("b", |r| Ok(Step::Continue(r)))),
        ]
        .into_iter()
        .collect();

        assert_eq!(chain.names(), vec!["a", "b"]);
        assert_eq!(chain.len(), 2);
        assert_eq!(format!("{chain:?}"), "MiddlewareChain { stages: [\"a\", \"b\"] }");
    }
}
