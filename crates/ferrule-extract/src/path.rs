//! Path parameter binders.

use crate::{BindingContext, BindingError, BindingSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Binds the route's path parameters onto `T`.
///
/// Parameter values are lower-cased by the router. Conversion goes through
/// `serde_urlencoded`, so numeric fields parse from their text.
///
/// # Example
///
/// ```rust
/// use ferrule_core::InternalRequest;
/// use ferrule_extract::{BindingContext, FromRequest, Params, Path};
/// use http::Method;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct PostPath {
///     user_id: u64,
///     post_id: u64,
/// }
///
/// let request = InternalRequest::new(Method::GET, "/users/42/posts/123");
/// let mut params = Params::new();
/// params.insert("user_id", "42");
/// params.insert("post_id", "123");
///
/// let Path(path) = Path::<PostPath>::from_request(&BindingContext::new(&request, &params)).unwrap();
/// assert_eq!(path.user_id, 42);
/// assert_eq!(path.post_id, 123);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    /// Consumes the Path and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Path<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Path<T> {
    fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
        let pairs: Vec<(&str, &str)> = ctx.path_params().iter().collect();
        let encoded = serde_urlencoded::to_string(&pairs)
            .map_err(|e| BindingError::deserialization_failed(BindingSource::Path, e))?;

        serde_urlencoded::from_str(&encoded).map(Path).map_err(|e| {
            match undeclared_field(&e.to_string()) {
                Some(name) if ctx.path_param(name).is_none() => {
                    BindingError::missing(BindingSource::Path, name)
                }
                _ => BindingError::deserialization_failed(BindingSource::Path, e),
            }
        })
    }
}

/// The field serde reported as absent, if that is why conversion failed.
///
/// Every value the router bound is present in the encoded input, so a
/// required field serde cannot find names a parameter the route lacks.
fn undeclared_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
}

/// Binds a single path parameter by name.
///
/// # Errors
///
/// A parameter the route does not declare is a missing-path error, which
/// the pipeline reports as a configuration error. A value that does not
/// parse as `T` is an invalid-type error (400).
///
/// # Example
///
/// ```rust
/// use ferrule_core::InternalRequest;
/// use ferrule_extract::{path_param, BindingContext, Params};
/// use http::Method;
///
/// let request = InternalRequest::new(Method::GET, "/users/42");
/// let mut params = Params::new();
/// params.insert("user_id", "42");
///
/// let user_id: u64 = path_param(&BindingContext::new(&request, &params), "user_id").unwrap();
/// assert_eq!(user_id, 42);
/// ```
pub fn path_param<T: std::str::FromStr>(
    ctx: &BindingContext<'_>,
    name: &str,
) -> Result<T, BindingError> {
    let value = ctx
        .path_param(name)
        .ok_or_else(|| BindingError::missing(BindingSource::Path, name))?;

    value.parse().map_err(|_| {
        BindingError::invalid_type(
            BindingSource::Path,
            name,
            format!("failed to parse as {}", std::any::type_name::<T>()),
        )
    })
}
