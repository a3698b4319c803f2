//! Core middleware trait and continuation.
//!
//! A middleware receives the in-flight [`InternalRequest`] and a [`Next`]
//! continuation. Calling [`Next::run`] hands the request, possibly modified,
//! to the rest of the chain; whatever it passes on is what every later
//! stage and the handler see. Not calling it halts the chain, and the
//! middleware says so explicitly by returning [`Flow::Halted`].
//!
//! # Example
//!
//! ```
//! use ferrule_core::{ApplicationError, InternalRequest};
//! use ferrule_middleware::{BoxFuture, Flow, Middleware, Next};
//!
//! struct Tenant;
//!
//! impl Middleware for Tenant {
//!     fn name(&self) -> &'static str {
//!         "tenant"
//!     }
//!
//!     fn invoke<'a>(
//!         &'a self,
//!         mut request: InternalRequest,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Result<Flow, ApplicationError>> {
//!         Box::pin(async move {
//!             if request.header("x-tenant").is_none() {
//!                 return Ok(Flow::halt());
//!             }
//!             request.set_header("x-tenant-checked", "true");
//!             next.run(request).await
//!         })
//!     }
//! }
//! ```

use crate::flow::Flow;
use ferrule_core::{ApplicationError, InternalRequest, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The middleware capability contract.
///
/// # Invariants
///
/// - A middleware calls `next.run()` at most once.
/// - A middleware that does not call it returns [`Flow::Halted`], with or
///   without a response of its own.
/// - Errors from downstream are propagated, not swallowed.
pub trait Middleware: Send + Sync + 'static {
    /// Name used in logs and halt reports.
    fn name(&self) -> &'static str;

    /// Processes the request, optionally continuing the chain.
    fn invoke<'a>(
        &'a self,
        request: InternalRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Flow, ApplicationError>>;
}

/// The terminal step of a chain: binds parameters and calls the handler.
pub type Endpoint<'a> =
    Box<dyn FnOnce(InternalRequest) -> BoxFuture<'a, Result<Response, ApplicationError>> + Send + 'a>;

/// Continuation to the rest of the chain.
///
/// Consumed by [`run`](Self::run), so it can be invoked only once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Endpoint(Endpoint<'a>),
}

impl<'a> Next<'a> {
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// A continuation that goes straight to `endpoint`.
    pub fn endpoint<F>(endpoint: F) -> Self
    where
        F: FnOnce(InternalRequest) -> BoxFuture<'a, Result<Response, ApplicationError>> + Send + 'a,
    {
        Self {
            inner: NextInner::Endpoint(Box::new(endpoint)),
        }
    }

    /// Invokes the next middleware, or the endpoint at the end of the chain.
    ///
    /// A halt reported by a middleware that did not name itself is
    /// attributed to that middleware.
    pub async fn run(self, request: InternalRequest) -> Result<Flow, ApplicationError> {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                tracing::trace!(middleware = middleware.name(), "entering middleware");
                let flow = middleware.invoke(request, *next).await?;
                Ok(flow.attribute(middleware.name()))
            }
            NextInner::Endpoint(endpoint) => endpoint(request).await.map(Flow::Completed),
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            NextInner::Chain { middleware, .. } => {
                f.debug_tuple("Next::Chain").field(&middleware.name()).finish()
            }
            NextInner::Endpoint(_) => f.write_str("Next::Endpoint"),
        }
    }
}
