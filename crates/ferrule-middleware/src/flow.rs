//! The explicit outcome of running a middleware chain.

use ferrule_core::Response;

/// How a chain finished.
#[derive(Debug)]
pub enum Flow {
    /// The chain reached the handler, which produced this response.
    Completed(Response),
    /// A middleware stopped the chain before the handler.
    Halted(Halt),
}

impl Flow {
    /// A halt without a response.
    #[must_use]
    pub fn halt() -> Self {
        Self::Halted(Halt::default())
    }

    /// A halt that answers the request with `response`.
    #[must_use]
    pub fn respond(response: Response) -> Self {
        Self::Halted(Halt {
            middleware: None,
            response: Some(response),
        })
    }

    /// Whether the handler ran.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Whether a middleware halted the chain.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted(_))
    }

    /// The response to send. A silent halt becomes an empty `200 OK`.
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            Self::Completed(response) => response,
            Self::Halted(halt) => halt.into_response().unwrap_or_default(),
        }
    }

    pub(crate) fn attribute(self, name: &'static str) -> Self {
        match self {
            Self::Halted(Halt {
                middleware: None,
                response,
            }) => Self::Halted(Halt {
                middleware: Some(name),
                response,
            }),
            other => other,
        }
    }
}

/// A halted chain.
#[derive(Debug, Default)]
pub struct Halt {
    middleware: Option<&'static str>,
    response: Option<Response>,
}

impl Halt {
    /// The middleware that halted, once the chain has attributed it.
    #[must_use]
    pub fn middleware(&self) -> Option<&'static str> {
        self.middleware
    }

    /// The short-circuit response, if the middleware produced one.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Whether the middleware halted without producing a response.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.response.is_none()
    }

    /// Takes the short-circuit response.
    #[must_use]
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_silent_halt_is_empty_ok() {
        let flow = Flow::halt();
        assert!(flow.is_halted());
        let response = flow.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.data().is_none());
    }

    #[test]
    fn test_respond_keeps_response() {
        let flow = Flow::respond(Response::new(StatusCode::UNAUTHORIZED));
        match &flow {
            Flow::Halted(halt) => assert!(!halt.is_silent()),
            Flow::Completed(_) => panic!("expected a halt"),
        }
        assert_eq!(flow.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_attribution_keeps_innermost_name() {
        let flow = Flow::halt().attribute("auth").attribute("logging");
        match flow {
            Flow::Halted(halt) => assert_eq!(halt.middleware(), Some("auth")),
            Flow::Completed(_) => panic!("expected a halt"),
        }
        assert!(Flow::Completed(Response::ok()).attribute("auth").is_completed());
    }
}
