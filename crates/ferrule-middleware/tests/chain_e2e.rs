//! End-to-end middleware chain tests.
//!
//! These tests assemble chains the way the request pipeline does: global
//! middleware first, then route middleware, resolved through a per-request
//! DI scope, around an endpoint that records whether it ran.

use ferrule_core::di::{Arguments, Dependency, DiResult, Injectable, ServiceRegistry};
use ferrule_core::{ApplicationError, HttpUser, InternalRequest, Response};
use ferrule_middleware::{
    before, BoxFuture, Flow, Middleware, MiddlewareChain, MiddlewareRef, Next, Step,
};
use http::{Method, StatusCode};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared log of visited stages.
#[derive(Default)]
struct Trail(Mutex<Vec<String>>);

impl Trail {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Records its name and continues.
struct Visit {
    name: &'static str,
    trail: Arc<Trail>,
}

impl Middleware for Visit {
    fn name(&self) -> &'static str {
        self.name
    }

    fn invoke<'a>(
        &'a self,
        request: InternalRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Flow, ApplicationError>> {
        Box::pin(async move {
            self.trail.push(self.name);
            next.run(request).await
        })
    }
}

/// Never continues and returns no response.
struct Swallow;

impl Middleware for Swallow {
    fn name(&self) -> &'static str {
        "swallow"
    }

    fn invoke<'a>(
        &'a self,
        _request: InternalRequest,
        _next: Next<'a>,
    ) -> BoxFuture<'a, Result<Flow, ApplicationError>> {
        Box::pin(async { Ok(Flow::halt()) })
    }
}

/// Attaches a user from the bearer token, resolved from DI.
struct Authenticate {
    trail: Arc<Trail>,
}

impl Injectable for Authenticate {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::bound::<Trail>("trail")]
    }

    fn construct(args: &Arguments) -> DiResult<Self> {
        Ok(Self {
            trail: args.service("trail")?,
        })
    }
}

impl Middleware for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    fn invoke<'a>(
        &'a self,
        mut request: InternalRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Flow, ApplicationError>> {
        Box::pin(async move {
            self.trail.push("authenticate");
            let Some(token) = request.header("authorization").map(str::to_owned) else {
                return Ok(Flow::respond(
                    Response::from(ApplicationError::status(
                        StatusCode::UNAUTHORIZED,
                        "UNAUTHENTICATED",
                        "missing bearer token",
                    )),
                ));
            };
            request.set_user(Some(HttpUser {
                username: Some("ada".into()),
                token: Some(token),
                ..HttpUser::default()
            }));
            next.run(request).await
        })
    }
}

/// Resolves every handle through one scope, global handles first.
fn assemble(registry: &ServiceRegistry, handles: &[MiddlewareRef]) -> MiddlewareChain {
    let scope = registry.create_scope();
    handles
        .iter()
        .map(|handle| handle.resolve(&scope).unwrap())
        .collect()
}

async fn dispatch(
    chain: &MiddlewareChain,
    request: InternalRequest,
    trail: Arc<Trail>,
    reached: Arc<AtomicBool>,
) -> Result<Flow, ApplicationError> {
    chain
        .run(request, move |request| {
            Box::pin(async move {
                reached.store(true, Ordering::SeqCst);
                trail.push("handler");
                let user = request.user().and_then(|u| u.username.clone());
                Response::json(&serde_json::json!({ "user": user }))
            })
        })
        .await
}

fn registry_with(trail: &Arc<Trail>) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry.bind_instance(Arc::clone(trail)).unwrap();
    registry
}

#[tokio::test]
async fn test_global_then_route_order() {
    let trail = Arc::new(Trail::default());
    let registry = registry_with(&trail);
    let reached = Arc::new(AtomicBool::new(false));

    let global = MiddlewareRef::instance(Visit {
        name: "global",
        trail: Arc::clone(&trail),
    });
    let route = MiddlewareRef::instance(Visit {
        name: "route",
        trail: Arc::clone(&trail),
    });
    let chain = assemble(&registry, &[global, MiddlewareRef::of::<Authenticate>(), route]);

    let request = InternalRequest::new(Method::GET, "/me").with_header("Authorization", "Bearer t");
    let flow = dispatch(&chain, request, Arc::clone(&trail), Arc::clone(&reached))
        .await
        .unwrap();

    assert!(reached.load(Ordering::SeqCst));
    assert_eq!(trail.entries(), vec!["global", "authenticate", "route", "handler"]);
    let response = flow.into_response();
    assert_eq!(response.data().unwrap()["user"], "ada");
}

#[tokio::test]
async fn test_silent_halt_skips_handler() {
    let trail = Arc::new(Trail::default());
    let registry = registry_with(&trail);
    let reached = Arc::new(AtomicBool::new(false));

    let chain = assemble(
        &registry,
        &[
            MiddlewareRef::instance(Swallow),
            MiddlewareRef::instance(Visit {
                name: "second",
                trail: Arc::clone(&trail),
            }),
        ],
    );

    let flow = dispatch(
        &chain,
        InternalRequest::new(Method::GET, "/"),
        Arc::clone(&trail),
        Arc::clone(&reached),
    )
    .await
    .unwrap();

    assert!(!reached.load(Ordering::SeqCst));
    assert!(trail.entries().is_empty());
    match flow {
        Flow::Halted(halt) => {
            assert!(halt.is_silent());
            assert_eq!(halt.middleware(), Some("swallow"));
        }
        Flow::Completed(_) => panic!("handler must not run"),
    }
}

#[tokio::test]
async fn test_short_circuit_response() {
    let trail = Arc::new(Trail::default());
    let registry = registry_with(&trail);
    let reached = Arc::new(AtomicBool::new(false));

    let chain = assemble(&registry, &[MiddlewareRef::of::<Authenticate>()]);
    let flow = dispatch(
        &chain,
        InternalRequest::new(Method::GET, "/me"),
        Arc::clone(&trail),
        Arc::clone(&reached),
    )
    .await
    .unwrap();

    assert!(!reached.load(Ordering::SeqCst));
    let response = flow.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.error().unwrap().code, "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_modified_request_reaches_handler() {
    let trail = Arc::new(Trail::default());
    let reached = Arc::new(AtomicBool::new(false));

    let mut chain = MiddlewareChain::new();
    chain.push(Arc::new(before("impersonate", |mut request: InternalRequest| {
        request.set_user(Some(HttpUser {
            username: Some("grace".into()),
            ..HttpUser::default()
        }));
        Ok(Step::Continue(request))
    })));

    let flow = dispatch(
        &chain,
        InternalRequest::new(Method::GET, "/me"),
        Arc::clone(&trail),
        Arc::clone(&reached),
    )
    .await
    .unwrap();

    assert_eq!(flow.into_response().data().unwrap()["user"], "grace");
}

#[tokio::test]
async fn test_each_scope_resolves_fresh_middleware() {
    let trail = Arc::new(Trail::default());
    let registry = registry_with(&trail);
    let handle = MiddlewareRef::of::<Authenticate>();

    let first = handle.resolve(&registry.create_scope()).unwrap();
    let second = handle.resolve(&registry.create_scope()).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}
