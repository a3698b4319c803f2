//! # Ferrule Test
//!
//! In-memory testing for Ferrule applications. A [`TestClient`] feeds
//! requests through [`App::handle`](ferrule::App::handle), the same path a
//! server would use, and buffers the response for assertions.
//!
//! ```
//! use ferrule::prelude::*;
//! use ferrule_test::TestClient;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let client = TestClient::new(App::builder().build().unwrap());
//! client
//!     .get("/missing")
//!     .send()
//!     .await
//!     .assert_status(http::StatusCode::NOT_FOUND)
//!     .assert_error_code("ROUTE_NOT_FOUND");
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequestBuilder;
pub use response::TestResponse;
