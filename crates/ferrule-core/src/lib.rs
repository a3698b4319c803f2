//! # Ferrule Core
//!
//! Core types for the Ferrule web-API runtime.
//!
//! - [`InternalRequest`] - The normalized request every pipeline stage sees
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Response`] - Handler output and its `{ data, errors, isError }` envelope
//! - [`ApplicationError`] - The error taxonomy and its HTTP mapping
//! - [`di`] - Service registry and per-request instance provider

#![doc(html_root_url = "https://docs.rs/ferrule-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod di;
mod error;
mod request;
mod response;

pub use error::{AppResult, ApplicationError, ErrorCategory, InnerError};
pub use request::{HttpUser, InternalRequest, RequestId};
pub use response::{ErrorBody, Response, ResponseEnvelope};
