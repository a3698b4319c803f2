//! Binding context providing access to request data.

use ferrule_core::InternalRequest;
use ferrule_router::Params;
use serde_json::Value;
use std::collections::HashMap;

/// Everything parameter binding can read: the request as the middleware
/// chain left it, and the path parameters the route resolver captured.
///
/// # Example
///
/// ```rust
/// use ferrule_core::InternalRequest;
/// use ferrule_extract::{BindingContext, Params};
/// use http::Method;
///
/// let request = InternalRequest::new(Method::GET, "/users/123");
/// let mut params = Params::new();
/// params.insert("id", "123");
///
/// let ctx = BindingContext::new(&request, &params);
/// assert_eq!(ctx.path_param("id"), Some("123"));
/// assert!(ctx.body().is_none());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    request: &'a InternalRequest,
    path_params: &'a Params,
}

impl<'a> BindingContext<'a> {
    /// Creates a binding context.
    #[must_use]
    pub fn new(request: &'a InternalRequest, path_params: &'a Params) -> Self {
        Self {
            request,
            path_params,
        }
    }

    /// The request being bound.
    #[must_use]
    pub fn request(&self) -> &'a InternalRequest {
        self.request
    }

    /// Path parameters captured by the route.
    #[must_use]
    pub fn path_params(&self) -> &'a Params {
        self.path_params
    }

    /// One path parameter.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&'a str> {
        self.path_params.get(name)
    }

    /// Query parameters.
    #[must_use]
    pub fn query(&self) -> &'a HashMap<String, String> {
        self.request.query()
    }

    /// The parsed JSON body.
    #[must_use]
    pub fn body(&self) -> Option<&'a Value> {
        self.request.body()
    }
}
