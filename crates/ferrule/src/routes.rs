//! Route registration.

use crate::endpoint::{Endpoint, HandlerRef};
use ferrule_middleware::MiddlewareRef;
use ferrule_router::{RouteMethod, RouteResult, Router};

/// The route table an [`App`](crate::App) dispatches against.
pub type RouteTable = Router<HandlerRef, MiddlewareRef>;

/// Collects routes at startup.
///
/// Registration is the only time the table changes; once handed to
/// [`AppBuilder`](crate::AppBuilder) it is read-only.
///
/// # Example
///
/// ```
/// use ferrule::{HandlerRef, RouteBuilder};
/// use ferrule_router::RouteMethod;
/// # use ferrule::prelude::*;
/// # #[derive(Default)]
/// # struct Health;
/// # ferrule::injectable!(Health);
/// # impl Endpoint for Health {
/// #     type Args = ();
/// #     async fn invoke(&self, _: ()) -> Result<Response, ApplicationError> { Ok(Response::ok()) }
/// # }
///
/// let mut routes = RouteBuilder::new();
/// routes.get::<Health>("/health").unwrap();
/// assert!(routes
///     .route(RouteMethod::Get, "/health", HandlerRef::of::<Health>(), [])
///     .is_err());
/// assert_eq!(routes.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RouteBuilder {
    table: RouteTable,
}

impl RouteBuilder {
    /// Creates an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route with its own middleware.
    ///
    /// Route middleware runs after global middleware, in the order given.
    ///
    /// # Errors
    ///
    /// Fails for duplicate routes, empty interior segments, and methods
    /// other than `GET, POST, PUT, PATCH, DELETE`.
    pub fn route(
        &mut self,
        method: RouteMethod,
        template: &str,
        handler: HandlerRef,
        middleware: impl IntoIterator<Item = MiddlewareRef>,
    ) -> RouteResult<&mut Self> {
        let middleware: Vec<MiddlewareRef> = middleware.into_iter().collect();
        tracing::debug!(
            method = %method,
            path = template,
            handler = handler.name(),
            middleware = middleware.len(),
            "route registered"
        );
        self.table.add_route(method, template, handler, middleware)?;
        Ok(self)
    }

    /// Registers a `GET` route.
    pub fn get<E: Endpoint>(&mut self, template: &str) -> RouteResult<&mut Self> {
        self.route(RouteMethod::Get, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `POST` route.
    pub fn post<E: Endpoint>(&mut self, template: &str) -> RouteResult<&mut Self> {
        self.route(RouteMethod::Post, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `PUT` route.
    pub fn put<E: Endpoint>(&mut self, template: &str) -> RouteResult<&mut Self> {
        self.route(RouteMethod::Put, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `PATCH` route.
    pub fn patch<E: Endpoint>(&mut self, template: &str) -> RouteResult<&mut Self> {
        self.route(RouteMethod::Patch, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `DELETE` route.
    pub fn delete<E: Endpoint>(&mut self, template: &str) -> RouteResult<&mut Self> {
        self.route(RouteMethod::Delete, template, HandlerRef::of::<E>(), [])
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The finished table.
    #[must_use]
    pub fn into_table(self) -> RouteTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_core::{ApplicationError, Response};
    use ferrule_middleware::{before, Step};
    use ferrule_router::RouteError;
    use http::Method;

    #[derive(Default)]
    struct Ping;
    ferrule_core::injectable!(Ping);

    impl Endpoint for Ping {
        type Args = ();

        async fn invoke(&self, (): ()) -> Result<Response, ApplicationError> {
            Ok(Response::ok())
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut routes = RouteBuilder::new();
        routes
            .get::<Ping>("/ping")
            .and_then(|r| r.post::<Ping>("/ping"))
            .and_then(|r| r.delete::<Ping>("/ping/{id}"))
            .unwrap();

        let table = routes.into_table();
        assert_eq!(table.len(), 3);
        let matched = table.resolve(&Method::DELETE, "/ping/9").unwrap();
        assert!(matched.handler.name().ends_with("Ping"));
        assert_eq!(matched.params.get("id"), Some("9"));
    }

    #[test]
    fn test_route_middleware_kept_in_order() {
        let mut routes = RouteBuilder::new();
        let first = MiddlewareRef::instance(before("first", |r| Ok(Step::Continue(r))));
        let second = MiddlewareRef::instance(before("second", |r| Ok(Step::Continue(r))));
        routes
            .route(RouteMethod::Put, "/items/{id}", HandlerRef::of::<Ping>(), [first, second])
            .unwrap();

        let table = routes.into_table();
        let matched = table.resolve(&Method::PUT, "/items/1").unwrap();
        let names: Vec<_> = matched.middleware.iter().map(MiddlewareRef::name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut routes = RouteBuilder::new();
        routes.patch::<Ping>("/items/{id}").unwrap();
        let err = routes.patch::<Ping>("/Items/{id}/").unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn test_unroutable_method_rejected() {
        let mut routes = RouteBuilder::new();
        let err = routes
            .route(RouteMethod::Options, "/ping", HandlerRef::of::<Ping>(), [])
            .unwrap_err();
        assert!(matches!(err, RouteError::MethodNotRoutable { .. }));
        assert!(routes.is_empty());
    }
}
