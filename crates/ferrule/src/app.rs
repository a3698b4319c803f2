//! The application and its request pipeline.
//!
//! Every request walks the same states in order:
//!
//! ```text
//! Normalized ─▶ RouteResolved ─▶ MiddlewareRun ─▶ ParametersBound ─▶ HandlerInvoked
//!     │
//!     └─ OPTIONS: Preflight (200, no body)
//! ```
//!
//! Each request gets its own [`InstanceProvider`] scope created from the
//! startup [`ServiceRegistry`], so scoped services never outlive it.

use crate::endpoint::{Endpoint, HandlerRef};
use crate::normalize::normalize;
use crate::routes::{RouteBuilder, RouteTable};
use bytes::Bytes;
use ferrule_config::{Configuration, LogFormat, RuntimeSettings};
use ferrule_core::di::{DiResult, Injectable, InstanceProvider, ProviderOptions, ServiceRegistry};
use ferrule_core::{ApplicationError, ErrorCategory, InternalRequest, Response};
use ferrule_extract::BindingContext;
use ferrule_middleware::{Flow, Halt, Middleware, MiddlewareChain, MiddlewareRef};
use ferrule_router::{RouteError, RouteMethod};
use ferrule_telemetry::{metrics, InFlightGuard, LogConfig};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// How a dispatched request ended.
#[derive(Debug)]
pub enum Outcome {
    /// An `OPTIONS` request, answered without routing.
    Preflight,
    /// The chain ran through to the handler, or a middleware answered.
    Completed(Response),
    /// A middleware stopped the chain.
    Halted(Halt),
}

impl Outcome {
    /// The status this outcome is written with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Preflight => StatusCode::OK,
            Self::Completed(response) => response.status(),
            Self::Halted(halt) => halt.response().map_or(StatusCode::OK, Response::status),
        }
    }

    /// Returns true for `OPTIONS` requests.
    #[must_use]
    pub fn is_preflight(&self) -> bool {
        matches!(self, Self::Preflight)
    }

    /// Returns true if a middleware stopped the chain.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted(_))
    }

    /// The response to write.
    ///
    /// A preflight and a silent halt are both an empty `200 OK`.
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            Self::Preflight => Response::ok(),
            Self::Completed(response) => response,
            Self::Halted(halt) => halt.into_response().unwrap_or_default(),
        }
    }
}

impl From<Flow> for Outcome {
    fn from(flow: Flow) -> Self {
        match flow {
            Flow::Completed(response) => Self::Completed(response),
            Flow::Halted(halt) => Self::Halted(halt),
        }
    }
}

/// Assembles an [`App`].
///
/// # Example
///
/// ```
/// use ferrule::prelude::*;
///
/// #[derive(Default)]
/// struct Health;
/// ferrule::injectable!(Health);
///
/// impl Endpoint for Health {
///     type Args = ();
///
///     async fn invoke(&self, (): ()) -> Result<Response, ApplicationError> {
///         Response::json(&serde_json::json!({ "status": "up" }))
///     }
/// }
///
/// # fn main() -> Result<(), ApplicationError> {
/// let app = App::builder()
///     .get::<Health>("/health")?
///     .build()?;
/// assert_eq!(app.route_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct AppBuilder {
    services: ServiceRegistry,
    routes: RouteBuilder,
    middleware: Vec<MiddlewareRef>,
    configuration: Configuration,
    options: Option<ProviderOptions>,
}

impl AppBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the service registry.
    #[must_use]
    pub fn services(mut self, services: ServiceRegistry) -> Self {
        self.services = services;
        self
    }

    /// Registers services on the current registry.
    ///
    /// # Errors
    ///
    /// Returns the first registration error as a configuration error.
    pub fn configure_services<F>(mut self, register: F) -> Result<Self, ApplicationError>
    where
        F: FnOnce(&mut ServiceRegistry) -> DiResult<()>,
    {
        register(&mut self.services)?;
        Ok(self)
    }

    /// Replaces the route table.
    #[must_use]
    pub fn routes(mut self, routes: RouteBuilder) -> Self {
        self.routes = routes;
        self
    }

    /// Registers a route with its own middleware.
    ///
    /// # Errors
    ///
    /// Registration errors are configuration errors.
    pub fn route(
        mut self,
        method: RouteMethod,
        template: &str,
        handler: HandlerRef,
        middleware: impl IntoIterator<Item = MiddlewareRef>,
    ) -> Result<Self, ApplicationError> {
        self.routes.route(method, template, handler, middleware)?;
        Ok(self)
    }

    /// Registers a `GET` route.
    pub fn get<E: Endpoint>(self, template: &str) -> Result<Self, ApplicationError> {
        self.route(RouteMethod::Get, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `POST` route.
    pub fn post<E: Endpoint>(self, template: &str) -> Result<Self, ApplicationError> {
        self.route(RouteMethod::Post, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `PUT` route.
    pub fn put<E: Endpoint>(self, template: &str) -> Result<Self, ApplicationError> {
        self.route(RouteMethod::Put, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `PATCH` route.
    pub fn patch<E: Endpoint>(self, template: &str) -> Result<Self, ApplicationError> {
        self.route(RouteMethod::Patch, template, HandlerRef::of::<E>(), [])
    }

    /// Registers a `DELETE` route.
    pub fn delete<E: Endpoint>(self, template: &str) -> Result<Self, ApplicationError> {
        self.route(RouteMethod::Delete, template, HandlerRef::of::<E>(), [])
    }

    /// Adds a global middleware instance. Global middleware runs before
    /// route middleware, in registration order.
    #[must_use]
    pub fn use_middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(MiddlewareRef::instance(middleware));
        self
    }

    /// Adds a global middleware resolved from each request's scope.
    #[must_use]
    pub fn use_middleware_of<M: Middleware + Injectable>(mut self) -> Self {
        self.middleware.push(MiddlewareRef::of::<M>());
        self
    }

    /// Sets the loaded configuration.
    #[must_use]
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Binds the configuration section at `path` onto `T` and registers
    /// the result as a shared service.
    ///
    /// # Errors
    ///
    /// Fails if the section does not match `T` or `T` is already bound.
    pub fn bind_configuration<T>(mut self, path: &str) -> Result<Self, ApplicationError>
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        let section: T = self.configuration.configure(path).map_err(|e| {
            ApplicationError::configuration_with_source(
                format!("cannot bind configuration section `{path}`"),
                e,
            )
        })?;
        self.services.bind_instance(Arc::new(section))?;
        Ok(self)
    }

    /// Overrides the provider options otherwise read from the `ferrule`
    /// configuration section.
    #[must_use]
    pub fn options(mut self, options: ProviderOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Installs the global log subscriber from the `ferrule.logging`
    /// settings.
    ///
    /// # Errors
    ///
    /// Fails if the settings are malformed or a subscriber is already
    /// installed.
    pub fn init_logging(self) -> Result<Self, ApplicationError> {
        let settings = self.runtime_settings()?;
        let config = LogConfig {
            enabled: settings.logging.enabled,
            level: settings.logging.level,
            json_format: settings.logging.format == LogFormat::Json,
            ..LogConfig::default()
        };
        ferrule_telemetry::init_logging(&config).map_err(|e| {
            ApplicationError::configuration_with_source("cannot initialize logging", e)
        })?;
        Ok(self)
    }

    /// Finishes startup.
    ///
    /// # Errors
    ///
    /// Fails if the `ferrule` configuration section is malformed.
    pub fn build(self) -> Result<App, ApplicationError> {
        let options = match self.options {
            Some(options) => options,
            None => ProviderOptions {
                auto_register: self.runtime_settings()?.services.auto_register,
            },
        };
        metrics::describe_metrics();

        let app = App {
            inner: Arc::new(AppInner {
                routes: self.routes.into_table(),
                middleware: self.middleware,
                services: self.services,
                configuration: self.configuration,
                options,
            }),
        };
        tracing::info!(
            routes = app.route_count(),
            services = app.inner.services.len(),
            global_middleware = app.inner.middleware.len(),
            auto_register = options.auto_register,
            "application built"
        );
        Ok(app)
    }

    fn runtime_settings(&self) -> Result<RuntimeSettings, ApplicationError> {
        RuntimeSettings::from_configuration(&self.configuration).map_err(|e| {
            ApplicationError::configuration_with_source("invalid `ferrule` settings", e)
        })
    }
}

#[derive(Debug)]
struct AppInner {
    routes: RouteTable,
    middleware: Vec<MiddlewareRef>,
    services: ServiceRegistry,
    configuration: Configuration,
    options: ProviderOptions,
}

/// A built application: routes, global middleware and the service
/// registry, shared read-only by every request.
///
/// Cloning is cheap.
#[derive(Debug, Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    /// Starts assembling an application.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.inner.routes.len()
    }

    /// The loaded configuration.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.inner.configuration
    }

    /// The startup registry requests are scoped from.
    #[must_use]
    pub fn services(&self) -> &ServiceRegistry {
        &self.inner.services
    }

    /// A fresh scope, as a request would get.
    #[must_use]
    pub fn create_scope(&self) -> InstanceProvider {
        self.inner.services.create_scope_with(self.inner.options)
    }

    /// Handles a transport request, mapping every error to an error
    /// response.
    pub async fn handle(&self, request: http::Request<Bytes>) -> Response {
        match self.dispatch(normalize(request)).await {
            Ok(outcome) => outcome.into_response(),
            Err(error) => Response::from(error),
        }
    }

    /// Runs one request through the pipeline.
    ///
    /// # Errors
    ///
    /// - 404 or 400 routing errors when no route matches
    /// - 400 binding errors when the handler's arguments cannot be bound
    /// - 500 configuration errors when a middleware or handler cannot be
    ///   resolved from the request scope
    /// - whatever the middleware or handler returns
    pub async fn dispatch(&self, request: InternalRequest) -> Result<Outcome, ApplicationError> {
        let span = tracing::info_span!(
            "request",
            request_id = %request.id(),
            method = %request.method(),
            path = %request.path(),
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: InternalRequest) -> Result<Outcome, ApplicationError> {
        if *request.method() == Method::OPTIONS {
            tracing::debug!("preflight request answered without routing");
            return Ok(Outcome::Preflight);
        }

        let started = Instant::now();
        let _in_flight = InFlightGuard::new();

        let matched = match self.inner.routes.resolve(request.method(), request.path()) {
            Ok(matched) => matched,
            Err(error) => {
                if matches!(error, RouteError::NotFound { .. }) {
                    metrics::record_route_miss(request.method().as_str());
                }
                tracing::debug!(error = %error, "route resolution failed");
                return Err(error.into());
            }
        };
        let handler = *matched.handler;
        tracing::debug!(
            handler = handler.name(),
            params = matched.params.len(),
            "route resolved"
        );

        let scope = self.create_scope();
        let chain = self
            .inner
            .middleware
            .iter()
            .chain(matched.middleware)
            .map(|middleware| middleware.resolve(&scope))
            .collect::<DiResult<MiddlewareChain>>()
            .map_err(|error| {
                tracing::error!(error = %error, "cannot resolve middleware");
                ApplicationError::from(error)
            })?;

        let params = matched.params;
        let scope = &scope;
        let result = chain
            .run(request, move |request| {
                Box::pin(async move {
                    let ctx = BindingContext::new(&request, &params);
                    handler.call(scope, &ctx)?.await
                })
            })
            .await;

        let elapsed = started.elapsed();
        let outcome = match result {
            Ok(flow) => Outcome::from(flow),
            Err(error) => {
                metrics::record_request(handler.name(), error.status_code().as_u16(), elapsed);
                log_failure(&error);
                return Err(error);
            }
        };

        if let Outcome::Halted(halt) = &outcome {
            let middleware = halt.middleware().unwrap_or("unknown");
            metrics::record_halt(middleware);
            if halt.is_silent() {
                tracing::warn!(middleware, "middleware halted the request without a response");
            }
        }

        let status = outcome.status().as_u16();
        metrics::record_request(handler.name(), status, elapsed);
        tracing::info!(
            handler = handler.name(),
            status_code = status,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "request completed"
        );
        Ok(outcome)
    }
}

fn log_failure(error: &ApplicationError) {
    let status = error.status_code().as_u16();
    match error.category() {
        ErrorCategory::Configuration => tracing::error!(
            error_code = error.error_code(),
            status_code = status,
            error = %error,
            "request failed on a configuration error"
        ),
        _ if error.status_code().is_server_error() => tracing::error!(
            error_code = error.error_code(),
            status_code = status,
            error = %error,
            "request failed"
        ),
        _ => tracing::info!(
            error_code = error.error_code(),
            status_code = status,
            "request rejected"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_config::ConfigLoader;
    use ferrule_core::di::{Arguments, Dependency};
    use ferrule_middleware::{before, Step};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Hits(AtomicUsize);

    struct Count {
        hits: Arc<Hits>,
    }

    impl Injectable for Count {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::bound::<Hits>("hits")]
        }

        fn construct(args: &Arguments) -> DiResult<Self> {
            Ok(Self {
                hits: args.service("hits")?,
            })
        }
    }

    impl Endpoint for Count {
        type Args = ();

        async fn invoke(&self, (): ()) -> Result<Response, ApplicationError> {
            let hits = self.hits.0.fetch_add(1, Ordering::SeqCst) + 1;
            Response::json(&json!({ "hits": hits }))
        }
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Limits {
        per_minute: u32,
    }

    fn counting_app() -> (App, Arc<Hits>) {
        let hits = Arc::new(Hits::default());
        let mut services = ServiceRegistry::new();
        services.bind_instance(Arc::clone(&hits)).unwrap();
        let app = App::builder()
            .services(services)
            .get::<Count>("/count")
            .unwrap()
            .build()
            .unwrap();
        (app, hits)
    }

    #[tokio::test]
    async fn test_options_short_circuits() {
        let (app, hits) = counting_app();
        let outcome = app
            .dispatch(InternalRequest::new(Method::OPTIONS, "/anything"))
            .await
            .unwrap();
        assert!(outcome.is_preflight());
        assert_eq!(outcome.status(), StatusCode::OK);
        assert_eq!(hits.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dispatch_completes() {
        let (app, hits) = counting_app();
        let outcome = app
            .dispatch(InternalRequest::new(Method::GET, "/Count"))
            .await
            .unwrap();
        let response = outcome.into_response();
        assert_eq!(response.data().unwrap()["hits"], 1);
        assert_eq!(hits.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let (app, _) = counting_app();
        let err = app
            .dispatch(InternalRequest::new(Method::GET, "/missing"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = app
            .dispatch(InternalRequest::new(Method::HEAD, "/count"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_path_is_bad_request() {
        let (app, _) = counting_app();
        let err = app
            .dispatch(InternalRequest::new(Method::GET, "/count//x"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_silent_halt_is_empty_ok() {
        let hits = Arc::new(Hits::default());
        let mut services = ServiceRegistry::new();
        services.bind_instance(Arc::clone(&hits)).unwrap();
        let app = App::builder()
            .services(services)
            .use_middleware(before("gate", |_| Ok(Step::Halt)))
            .get::<Count>("/count")
            .unwrap()
            .build()
            .unwrap();

        let outcome = app
            .dispatch(InternalRequest::new(Method::GET, "/count"))
            .await
            .unwrap();
        assert!(outcome.is_halted());
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.data().is_none());
        assert_eq!(hits.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unbound_handler_dependency_is_configuration_error() {
        let app = App::builder().get::<Count>("/count").unwrap().build().unwrap();
        let err = app
            .dispatch(InternalRequest::new(Method::GET, "/count"))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_route_is_configuration_error() {
        let err = App::builder()
            .get::<Count>("/count")
            .unwrap()
            .get::<Count>("/count/")
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_bind_configuration_registers_section() {
        let configuration = ConfigLoader::new()
            .with_defaults(json!({ "limits": { "per_minute": 30 } }))
            .load()
            .unwrap();
        let app = App::builder()
            .configuration(configuration)
            .bind_configuration::<Limits>("limits")
            .unwrap()
            .build()
            .unwrap();

        let limits = app.create_scope().get::<Limits>().unwrap();
        assert_eq!(limits.per_minute, 30);
    }

    #[test]
    fn test_auto_register_read_from_configuration() {
        let configuration = ConfigLoader::new()
            .with_defaults(json!({ "ferrule": { "services": { "auto_register": false } } }))
            .load()
            .unwrap();
        let app = App::builder()
            .configuration(configuration)
            .build()
            .unwrap();
        assert!(!app.create_scope().options().auto_register);

        let app = App::builder()
            .options(ProviderOptions {
                auto_register: false,
            })
            .build()
            .unwrap();
        assert!(!app.create_scope().options().auto_register);
    }

    #[test]
    fn test_malformed_runtime_settings_fail_build() {
        let configuration = ConfigLoader::new()
            .with_defaults(json!({ "ferrule": { "services": { "auto_register": "sometimes" } } }))
            .load()
            .unwrap();
        let err = App::builder()
            .configuration(configuration)
            .build()
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_disabled_logging_is_skipped() {
        let configuration = ConfigLoader::new()
            .with_defaults(json!({ "ferrule": { "logging": { "enabled": false } } }))
            .load()
            .unwrap();
        assert!(App::builder()
            .configuration(configuration)
            .init_logging()
            .is_ok());
    }
}
