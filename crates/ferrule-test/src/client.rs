//! In-memory client for a built [`App`].

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;
use ferrule::App;
use http::Method;
use serde::Serialize;

/// Sends requests straight into an [`App`]'s pipeline, without a socket.
///
/// # Example
///
/// ```
/// use ferrule::prelude::*;
/// use ferrule_test::TestClient;
///
/// #[derive(Default)]
/// struct Ping;
/// ferrule::injectable!(Ping);
///
/// impl Endpoint for Ping {
///     type Args = ();
///
///     async fn invoke(&self, (): ()) -> Result<Response, ApplicationError> {
///         Response::json(&"pong")
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let app = App::builder().get::<Ping>("/ping").unwrap().build().unwrap();
/// let client = TestClient::new(app);
///
/// let response = client.get("/ping").send().await;
/// response.assert_data(&serde_json::json!("pong"));
/// # }
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    app: App,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a built application.
    pub fn new(app: App) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The wrapped application.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Starts a `GET` request.
    pub fn get(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, path)
    }

    /// Starts a `POST` request.
    pub fn post(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, path)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, path)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, path)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, path)
    }

    /// Starts an `OPTIONS` request.
    pub fn options(&self, path: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, path)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, path: impl AsRef<str>) -> TestClientRequest<'_> {
        let builder = self
            .default_headers
            .iter()
            .fold(TestRequestBuilder::new(method, path), |builder, (name, value)| {
                builder.header(name, value)
            });
        TestClientRequest {
            client: self,
            builder,
        }
    }

    async fn dispatch(&self, builder: TestRequestBuilder) -> Result<TestResponse, TestError> {
        let request = builder.build()?;
        let response = self.app.handle(request).await;
        TestResponse::from_http(response.into_http()).await
    }
}

/// A request bound to a [`TestClient`].
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl TestClientRequest<'_> {
    /// Adds a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.query(name, value);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built; use
    /// [`try_send`](Self::try_send) to handle that case.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Sends the request, reporting build failures.
    ///
    /// # Errors
    ///
    /// Returns the builder's error, or a body read error.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        self.client.dispatch(self.builder).await
    }
}
