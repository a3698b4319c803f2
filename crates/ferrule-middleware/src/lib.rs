//! # Ferrule Middleware
//!
//! The middleware chain that runs between route resolution and the handler.
//!
//! ```text
//! Request → global middleware → route middleware → endpoint (bind + invoke)
//!                   │                   │
//!                   └──── Flow::Halted ─┴──→ short-circuit (no binding, no handler)
//! ```
//!
//! Each middleware receives the current [`InternalRequest`](ferrule_core::InternalRequest)
//! and a [`Next`] continuation. The request handed to the continuation
//! replaces the request for everything downstream. A middleware that does
//! not continue returns [`Flow::Halted`], optionally carrying its own
//! response, so a halted chain is always observable by the caller.
//!
//! ## Registration
//!
//! Middleware is registered through a typed [`MiddlewareRef`]:
//!
//! - [`MiddlewareRef::of`] resolves the type per request through the
//!   request's DI scope, building it if it is not bound.
//! - [`MiddlewareRef::instance`] shares one pre-built value.
//!
//! For simple synchronous checks, [`before`] adapts a closure returning a
//! [`Step`].

#![doc(html_root_url = "https://docs.rs/ferrule-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod flow;
pub mod handle;
pub mod hook;
pub mod middleware;

// Re-export main types at crate root
pub use chain::{BoxedMiddleware, MiddlewareChain};
pub use flow::{Flow, Halt};
pub use handle::MiddlewareRef;
pub use hook::{before, Before, Step};
pub use middleware::{BoxFuture, Endpoint, Middleware, Next};
