//! Endpoints and the typed handles routes are bound to.

use ferrule_core::di::{Injectable, InstanceProvider};
use ferrule_core::{ApplicationError, Response};
use ferrule_extract::{BindingContext, FromRequest};
use ferrule_middleware::BoxFuture;
use std::fmt;
use std::future::Future;

/// Application logic behind a route.
///
/// An endpoint is a service: the request's scope builds it (or resolves a
/// bound instance) so its constructor dependencies are injected. Its
/// arguments are bound from the request by [`Args`](Self::Args) before the
/// instance is resolved.
///
/// # Example
///
/// ```
/// use ferrule::prelude::*;
/// use serde::Deserialize;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Catalog;
/// ferrule::injectable!(Catalog);
///
/// #[derive(Deserialize)]
/// struct ItemPath {
///     id: u64,
/// }
///
/// struct GetItem {
///     catalog: Arc<Catalog>,
/// }
///
/// impl Injectable for GetItem {
///     fn dependencies() -> Vec<Dependency> {
///         vec![Dependency::service::<Catalog>("catalog")]
///     }
///
///     fn construct(args: &Arguments) -> DiResult<Self> {
///         Ok(Self { catalog: args.service("catalog")? })
///     }
/// }
///
/// impl Endpoint for GetItem {
///     type Args = Path<ItemPath>;
///
///     async fn invoke(&self, Path(path): Self::Args) -> Result<Response, ApplicationError> {
///         Response::json(&serde_json::json!({ "id": path.id }))
///     }
/// }
/// ```
pub trait Endpoint: Injectable {
    /// What the endpoint binds from the request.
    type Args: FromRequest + Send + 'static;

    /// Handles one request.
    fn invoke(
        &self,
        args: Self::Args,
    ) -> impl Future<Output = Result<Response, ApplicationError>> + Send;
}

type CallFn = fn(
    &InstanceProvider,
    &BindingContext<'_>,
) -> Result<BoxFuture<'static, Result<Response, ApplicationError>>, ApplicationError>;

/// A typed reference to an [`Endpoint`], stored in the route table.
#[derive(Clone, Copy)]
pub struct HandlerRef {
    name: &'static str,
    call: CallFn,
}

impl HandlerRef {
    /// A handle for the endpoint type `E`.
    #[must_use]
    pub fn of<E: Endpoint>() -> Self {
        Self {
            name: std::any::type_name::<E>(),
            call: call_endpoint::<E>,
        }
    }

    /// The endpoint's type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Binds the arguments, resolves the endpoint from `provider` and
    /// returns its pending invocation.
    ///
    /// # Errors
    ///
    /// Binding failures are returned before the endpoint is resolved;
    /// resolution failures are configuration errors.
    pub fn call(
        &self,
        provider: &InstanceProvider,
        ctx: &BindingContext<'_>,
    ) -> Result<BoxFuture<'static, Result<Response, ApplicationError>>, ApplicationError> {
        (self.call)(provider, ctx)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandlerRef").field(&self.name).finish()
    }
}

fn call_endpoint<E: Endpoint>(
    provider: &InstanceProvider,
    ctx: &BindingContext<'_>,
) -> Result<BoxFuture<'static, Result<Response, ApplicationError>>, ApplicationError> {
    let args = E::Args::from_request(ctx)?;
    let endpoint = provider.resolve::<E>()?;
    Ok(Box::pin(async move { endpoint.invoke(args).await }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_core::di::{Arguments, Dependency, DiResult, ServiceRegistry};
    use ferrule_core::InternalRequest;
    use ferrule_extract::{Params, Payload};
    use http::{Method, StatusCode};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    #[derive(Deserialize)]
    struct Greeting {
        name: String,
    }

    struct Greet {
        counter: Arc<Counter>,
    }

    impl Injectable for Greet {
        fn dependencies() -> Vec<Dependency> {
            vec![Dependency::bound::<Counter>("counter")]
        }

        fn construct(args: &Arguments) -> DiResult<Self> {
            Ok(Self {
                counter: args.service("counter")?,
            })
        }
    }

    impl Endpoint for Greet {
        type Args = Payload<Greeting>;

        async fn invoke(&self, Payload(greeting): Self::Args) -> Result<Response, ApplicationError> {
            self.counter.0.fetch_add(1, Ordering::SeqCst);
            Response::json(&json!({ "hello": greeting.name }))
        }
    }

    fn registry(counter: &Arc<Counter>) -> ServiceRegistry {
        let mut registry = ServiceRegistry::new();
        registry.bind_instance(Arc::clone(counter)).unwrap();
        registry
    }

    #[tokio::test]
    async fn test_call_binds_then_invokes() {
        let counter = Arc::new(Counter::default());
        let scope = registry(&counter).create_scope();
        let request = InternalRequest::new(Method::POST, "/greet").with_body(json!({ "name": "ada" }));
        let params = Params::new();
        let ctx = BindingContext::new(&request, &params);

        let response = HandlerRef::of::<Greet>()
            .call(&scope, &ctx)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(response.data().unwrap()["hello"], "ada");
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_binding_fails_before_resolution() {
        // No Counter bound: resolving Greet would fail with a DI error, but
        // the missing body is reported first.
        let scope = ServiceRegistry::new().create_scope();
        let request = InternalRequest::new(Method::POST, "/greet");
        let params = Params::new();
        let ctx = BindingContext::new(&request, &params);

        let err = HandlerRef::of::<Greet>().call(&scope, &ctx).err().unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_resolution_failure_is_configuration() {
        let scope = ServiceRegistry::new().create_scope();
        let request =
            InternalRequest::new(Method::POST, "/greet").with_body(json!({ "name": "ada" }));
        let params = Params::new();
        let ctx = BindingContext::new(&request, &params);

        let err = HandlerRef::of::<Greet>().call(&scope, &ctx).err().unwrap();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_debug_shows_type_name() {
        let handle = HandlerRef::of::<Greet>();
        assert!(format!("{handle:?}").contains("Greet"));
        assert!(handle.name().ends_with("Greet"));
    }
}
