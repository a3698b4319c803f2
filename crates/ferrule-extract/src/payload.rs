//! JSON body binder.

use crate::{BindingContext, BindingError, BindingSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Binds the JSON request body onto `T`.
///
/// An absent body (none sent, or one that did not decode as JSON) is a
/// binding failure, as is a body missing a required field of `T` or
/// holding a value of the wrong type. Unknown fields are ignored unless
/// `T` opts into `#[serde(deny_unknown_fields)]`.
///
/// # Example
///
/// ```rust
/// use ferrule_core::InternalRequest;
/// use ferrule_extract::{BindingContext, FromRequest, Params, Payload};
/// use http::Method;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct CreateItem {
///     a: u32,
///     b: String,
/// }
///
/// let request = InternalRequest::new(Method::POST, "/items").with_body(json!({"a": 1, "b": "x"}));
/// let params = Params::new();
/// let Payload(item) = Payload::<CreateItem>::from_request(&BindingContext::new(&request, &params)).unwrap();
/// assert_eq!(item.a, 1);
/// assert_eq!(item.b, "x");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload<T>(pub T);

impl<T> Payload<T> {
    /// Consumes the Payload and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Payload<T> {
    fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
        let body = ctx
            .body()
            .ok_or_else(|| BindingError::missing(BindingSource::Body, "payload"))?;

        serde_json::from_value(body.clone())
            .map(Payload)
            .map_err(|e| BindingError::deserialization_failed(BindingSource::Body, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Params;
    use ferrule_core::{ApplicationError, InternalRequest};
    use http::{Method, StatusCode};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        a: u32,
        b: String,
        #[serde(default)]
        note: Option<String>,
    }

    fn bind(request: &InternalRequest) -> Result<Payload<Item>, BindingError> {
        let params = Params::new();
        Payload::from_request(&BindingContext::new(request, &params))
    }

    #[test]
    fn test_binds_fields() {
        let request = InternalRequest::new(Method::POST, "/").with_body(json!({"a": 1, "b": "x"}));
        let Payload(item) = bind(&request).unwrap();
        assert_eq!(
            item,
            Item {
                a: 1,
                b: "x".into(),
                note: None
            }
        );
    }

    #[test]
    fn test_missing_field_is_400() {
        let request = InternalRequest::new(Method::POST, "/").with_body(json!({"a": 1}));
        let err = bind(&request).unwrap_err();
        assert!(err.to_string().contains("missing field `b`"));

        let app: ApplicationError = err.into();
        assert_eq!(app.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let request =
            InternalRequest::new(Method::POST, "/").with_body(json!({"a": "one", "b": "x"}));
        assert!(bind(&request).is_err());
    }

    #[test]
    fn test_absent_body_is_missing() {
        let err = bind(&InternalRequest::new(Method::POST, "/")).unwrap_err();
        assert!(err.is_missing());
        assert_eq!(err.binding_source(), BindingSource::Body);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let request = InternalRequest::new(Method::POST, "/")
            .with_body(json!({"a": 2, "b": "y", "extra": true}));
        assert_eq!(bind(&request).unwrap().a, 2);
    }
}
