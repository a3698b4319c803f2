//! # Ferrule Extract
//!
//! Parameter binding for Ferrule handlers.
//!
//! A handler declares the request data it needs through the types of its
//! arguments. Each argument type implements [`FromRequest`] and reads from
//! a [`BindingContext`]:
//!
//! | Binder | Source | Failure |
//! |--------|--------|---------|
//! | [`Payload<T>`] | JSON body | 400 |
//! | [`Query<T>`] | Query parameters | 400 |
//! | `Option<Query<T>>` | Query parameters | never, `None` instead |
//! | [`Path<T>`] | Route path parameters | 400 |
//! | [`path_param`] | One path parameter | 400, or 500 if the route lacks it |
//! | `InternalRequest` | The whole request | never |
//!
//! ## Example
//!
//! ```rust
//! use ferrule_core::InternalRequest;
//! use ferrule_extract::{BindingContext, FromRequest, Params, Path, Query};
//! use http::Method;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ItemPath {
//!     id: u64,
//! }
//!
//! #[derive(Deserialize)]
//! struct Flags {
//!     verbose: bool,
//! }
//!
//! let request = InternalRequest::new(Method::GET, "/items/7").with_query_param("verbose", "true");
//! let mut params = Params::new();
//! params.insert("id", "7");
//!
//! let (Path(path), Query(flags)) =
//!     <(Path<ItemPath>, Query<Flags>)>::from_request(&BindingContext::new(&request, &params)).unwrap();
//! assert_eq!(path.id, 7);
//! assert!(flags.verbose);
//! ```
//!
//! ## Error Handling
//!
//! Binders return [`BindingError`], which converts into
//! [`ApplicationError`](ferrule_core::ApplicationError) carrying the
//! conversion failure as its inner error.

#![doc(html_root_url = "https://docs.rs/ferrule-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod extractor;
mod path;
mod payload;
mod query;

// Re-export main types
pub use context::BindingContext;
pub use error::{BindingError, BindingResult, BindingSource};
pub use extractor::FromRequest;
pub use path::{path_param, Path};
pub use payload::Payload;
pub use query::Query;

// Re-export useful types from dependencies
pub use ferrule_router::Params;
