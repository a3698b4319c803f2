//! Query string binder.

use crate::{BindingContext, BindingError, BindingSource, FromRequest};
use serde::de::DeserializeOwned;
use std::ops::Deref;

/// Binds the query parameters onto `T`.
///
/// Query values are strings on the wire; they are converted with
/// `serde_urlencoded`, so numeric and boolean fields parse as expected.
/// Declare the handler argument as `Option<Query<T>>` to make the query
/// optional: a failed conversion then yields `None` instead of a 400.
///
/// # Example
///
/// ```rust
/// use ferrule_core::InternalRequest;
/// use ferrule_extract::{BindingContext, FromRequest, Params, Query};
/// use http::Method;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct ListParams {
///     #[serde(default)]
///     limit: Option<u32>,
///     #[serde(default)]
///     verbose: bool,
/// }
///
/// let request = InternalRequest::new(Method::GET, "/items")
///     .with_query_param("limit", "10")
///     .with_query_param("verbose", "true");
/// let params = Params::new();
///
/// let Query(list) = Query::<ListParams>::from_request(&BindingContext::new(&request, &params)).unwrap();
/// assert_eq!(list.limit, Some(10));
/// assert!(list.verbose);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Consumes the Query and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Query<T> {
    fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
        let query_string = serde_urlencoded::to_string(ctx.query())
            .map_err(|e| BindingError::deserialization_failed(BindingSource::Query, e))?;

        let value: T = serde_urlencoded::from_str(&query_string)
            .map_err(|e| BindingError::deserialization_failed(BindingSource::Query, e))?;

        Ok(Query(value))
    }
}

impl<T: DeserializeOwned> FromRequest for Option<Query<T>> {
    fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
        Ok(Query::from_request(ctx).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Params;
    use ferrule_core::InternalRequest;
    use http::Method;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Paging {
        page: u32,
        #[serde(default)]
        search: Option<String>,
    }

    fn ctx_bind<T: FromRequest>(request: &InternalRequest) -> Result<T, BindingError> {
        let params = Params::new();
        T::from_request(&BindingContext::new(request, &params))
    }

    #[test]
    fn test_converts_values() {
        let request = InternalRequest::new(Method::GET, "/")
            .with_query_param("page", "3")
            .with_query_param("search", "rust lang & more");
        let Query(paging) = ctx_bind::<Query<Paging>>(&request).unwrap();
        assert_eq!(paging.page, 3);
        assert_eq!(paging.search.as_deref(), Some("rust lang & more"));
    }

    #[test]
    fn test_required_field_missing() {
        let err = ctx_bind::<Query<Paging>>(&InternalRequest::new(Method::GET, "/")).unwrap_err();
        assert_eq!(err.binding_source(), BindingSource::Query);
    }

    #[test]
    fn test_optional_query_swallows_failure() {
        let request = InternalRequest::new(Method::GET, "/").with_query_param("page", "many");
        assert!(ctx_bind::<Option<Query<Paging>>>(&request).unwrap().is_none());

        let request = InternalRequest::new(Method::GET, "/").with_query_param("page", "2");
        let paging = ctx_bind::<Option<Query<Paging>>>(&request).unwrap().unwrap();
        assert_eq!(paging.page, 2);
    }

    #[test]
    fn test_empty_query_binds_defaults() {
        #[derive(Deserialize, Default)]
        struct Flags {
            #[serde(default)]
            verbose: bool,
        }

        let Query(flags) = ctx_bind::<Query<Flags>>(&InternalRequest::new(Method::GET, "/")).unwrap();
        assert!(!flags.verbose);
    }
}
