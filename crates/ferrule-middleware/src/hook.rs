//! Synchronous request hooks.

use crate::flow::Flow;
use crate::middleware::{BoxFuture, Middleware, Next};
use ferrule_core::{ApplicationError, InternalRequest, Response};

/// What a [`before`] hook decided.
#[derive(Debug)]
pub enum Step {
    /// Continue the chain with this request.
    Continue(InternalRequest),
    /// Answer the request without reaching the handler.
    Respond(Response),
    /// Stop the chain without a response.
    Halt,
}

/// A middleware built from a synchronous hook. See [`before`].
pub struct Before<F> {
    name: &'static str,
    hook: F,
}

/// Wraps a synchronous hook as middleware.
///
/// The hook decides explicitly whether the chain continues, so it cannot
/// halt by accident.
///
/// # Example
///
/// ```
/// use ferrule_core::{InternalRequest, Response};
/// use ferrule_middleware::{before, Step};
/// use http::StatusCode;
///
/// let require_key = before("require-api-key", |request: InternalRequest| {
///     Ok(match request.header("x-api-key") {
///         Some(_) => Step::Continue(request),
///         None => Step::Respond(Response::new(StatusCode::UNAUTHORIZED)),
///     })
/// });
/// ```
pub fn before<F>(name: &'static str, hook: F) -> Before<F>
where
    F: Fn(InternalRequest) -> Result<Step, ApplicationError> + Send + Sync + 'static,
{
    Before { name, hook }
}

impl<F> Middleware for Before<F>
where
    F: Fn(InternalRequest) -> Result<Step, ApplicationError> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn invoke<'a>(
        &'a self,
        request: InternalRequest,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Flow, ApplicationError>> {
        Box::pin(async move {
            match (self.hook)(request)? {
                Step::Continue(request) => next.run(request).await,
                Step::Respond(response) => Ok(Flow::respond(response)),
                Step::Halt => Ok(Flow::halt()),
            }
        })
    }
}
