//! # Ferrule
//!
//! A minimal web-API runtime. An application registers routes against
//! endpoint types, binds services in a registry, and hands each incoming
//! request to a fixed pipeline:
//!
//! ```text
//! Request ─▶ normalize ─▶ OPTIONS? ──yes──▶ 200, empty
//!                            │
//!                            ▼
//!                     resolve route ─▶ global middleware ─▶ route middleware
//!                                                                 │
//!               Response ◀── invoke endpoint ◀── bind payload, query, path
//! ```
//!
//! Every request gets its own dependency scope: scoped services are built
//! at most once per request, transient services on every resolution.
//!
//! ## Quick Start
//!
//! ```
//! use ferrule::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ItemPath {
//!     id: u64,
//! }
//!
//! #[derive(Default)]
//! struct GetItem;
//! ferrule::injectable!(GetItem);
//!
//! impl Endpoint for GetItem {
//!     type Args = Path<ItemPath>;
//!
//!     async fn invoke(&self, Path(path): Self::Args) -> Result<Response, ApplicationError> {
//!         Response::json(&serde_json::json!({ "id": path.id }))
//!     }
//! }
//!
//! # fn main() -> Result<(), ApplicationError> {
//! let app = App::builder()
//!     .get::<GetItem>("/items/{id}")?
//!     .build()?;
//! assert_eq!(app.route_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! | Re-export | Contents |
//! |-----------|----------|
//! | [`core`] | requests, responses, errors, dependency injection |
//! | [`router`] | the route trie |
//! | [`middleware`] | the middleware chain |
//! | [`extract`] | payload, query and path binding |
//! | [`config`] | layered configuration |
//! | [`telemetry`] | logging and metrics |

#![doc(html_root_url = "https://docs.rs/ferrule/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod endpoint;
mod normalize;
mod routes;

pub use app::{App, AppBuilder, Outcome};
pub use endpoint::{Endpoint, HandlerRef};
pub use normalize::normalize;
pub use routes::{RouteBuilder, RouteTable};

pub use ferrule_config as config;
pub use ferrule_core as core;
pub use ferrule_extract as extract;
pub use ferrule_middleware as middleware;
pub use ferrule_router as router;
pub use ferrule_telemetry as telemetry;

pub use ferrule_core::injectable;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use ferrule::prelude::*;
///
/// let registry = ServiceRegistry::new();
/// assert!(registry.is_empty());
/// ```
pub mod prelude {
    pub use crate::{App, AppBuilder, Endpoint, HandlerRef, Outcome, RouteBuilder};

    pub use ferrule_core::di::{
        Arguments, Dependency, DiError, DiResult, Injectable, Lifetime, ProviderOptions,
        ServiceRegistry,
    };
    pub use ferrule_core::{ApplicationError, HttpUser, InternalRequest, Response};

    pub use ferrule_extract::{FromRequest, Path, Payload, Query};

    pub use ferrule_middleware::{before, BoxFuture, Flow, Middleware, MiddlewareRef, Next, Step};

    pub use ferrule_router::RouteMethod;

    pub use ferrule_config::{ConfigLoader, Configuration};
}
