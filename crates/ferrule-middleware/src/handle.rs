//! Typed middleware handles for route and global registration.

use crate::chain::BoxedMiddleware;
use crate::middleware::Middleware;
use ferrule_core::di::{DiResult, Injectable, InstanceProvider};
use std::sync::Arc;

type ResolveFn = fn(&InstanceProvider) -> DiResult<BoxedMiddleware>;

#[derive(Clone)]
enum Source {
    Instance(BoxedMiddleware),
    Resolve(ResolveFn),
}

/// A middleware registered on a route or globally.
///
/// Registration takes a type or an instance, never a name, so a value that
/// is not a middleware is rejected at compile time.
///
/// # Example
///
/// ```
/// use ferrule_core::di::ServiceRegistry;
/// use ferrule_middleware::{before, MiddlewareRef, Step};
///
/// let audit = MiddlewareRef::instance(before("audit", |r| Ok(Step::Continue(r))));
/// assert_eq!(audit.name(), "audit");
///
/// let scope = ServiceRegistry::new().create_scope();
/// assert_eq!(audit.resolve(&scope).unwrap().name(), "audit");
/// ```
#[derive(Clone)]
pub struct MiddlewareRef {
    name: &'static str,
    source: Source,
}

impl MiddlewareRef {
    /// A middleware resolved per request through the request's scope.
    ///
    /// A bound `M` is resolved; an unbound one is built from its declared
    /// dependencies.
    #[must_use]
    pub fn of<M: Middleware + Injectable>() -> Self {
        Self {
            name: std::any::type_name::<M>(),
            source: Source::Resolve(resolve_erased::<M>),
        }
    }

    /// A pre-built middleware shared by every request.
    #[must_use]
    pub fn instance<M: Middleware>(middleware: M) -> Self {
        Self::shared(Arc::new(middleware))
    }

    /// A pre-built, already shared middleware.
    #[must_use]
    pub fn shared(middleware: BoxedMiddleware) -> Self {
        Self {
            name: middleware.name(),
            source: Source::Instance(middleware),
        }
    }

    /// The middleware's name, or its type name for resolved middleware.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Produces the middleware for one request.
    pub fn resolve(&self, provider: &InstanceProvider) -> DiResult<BoxedMiddleware> {
        match &self.source {
            Source::Instance(middleware) => Ok(Arc::clone(middleware)),
            Source::Resolve(resolve) => resolve(provider),
        }
    }
}

fn resolve_erased<M: Middleware + Injectable>(provider: &InstanceProvider) -> DiResult<BoxedMiddleware> {
    provider
        .resolve::<M>()
        .map(|middleware| middleware as BoxedMiddleware)
}

impl std::fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            Source::Instance(_) => "instance",
            Source::Resolve(_) => "resolved",
        };
        f.debug_struct("MiddlewareRef")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}
