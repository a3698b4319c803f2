//! Core binding trait.
//!
//! The [`FromRequest`] trait is what a handler's argument type implements.
//! It replaces reading the handler's parameter names at runtime: the
//! argument type itself says where its data comes from.

use crate::{BindingContext, BindingError};
use ferrule_core::InternalRequest;

/// Trait for types that can be bound from a request.
///
/// # Implementing `FromRequest`
///
/// ```rust
/// use ferrule_extract::{path_param, BindingContext, BindingError, FromRequest};
///
/// struct OrderKey {
///     customer: String,
///     order: u64,
/// }
///
/// impl FromRequest for OrderKey {
///     fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
///         Ok(Self {
///             customer: path_param(ctx, "customer")?,
///             order: path_param(ctx, "order")?,
///         })
///     }
/// }
/// ```
///
/// # Tuple Extractors
///
/// Tuples of binders bind each element in order and fail on the first
/// failure, so a handler declaring `(Path<Id>, Payload<Body>)` gets both or
/// neither.
pub trait FromRequest: Sized {
    /// Binds this type from the context.
    ///
    /// # Errors
    ///
    /// Returns a [`BindingError`] if the request data does not fit.
    fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError>;
}

/// The whole request, as the middleware chain left it.
impl FromRequest for InternalRequest {
    fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
        Ok(ctx.request().clone())
    }
}

// Implement FromRequest for tuples to allow combining binders
macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1);
impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);
impl_from_request_for_tuple!(T1, T2, T3, T4);
impl_from_request_for_tuple!(T1, T2, T3, T4, T5);
impl_from_request_for_tuple!(T1, T2, T3, T4, T5, T6);

// Handlers without parameters
impl FromRequest for () {
    fn from_request(_ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BindingSource, Params};
    use http::Method;

    struct PathText(String);

    impl FromRequest for PathText {
        fn from_request(ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
            Ok(Self(ctx.request().path().to_string()))
        }
    }

    struct Failing;

    impl FromRequest for Failing {
        fn from_request(_ctx: &BindingContext<'_>) -> Result<Self, BindingError> {
            Err(BindingError::missing(BindingSource::Body, "payload"))
        }
    }

    #[test]
    fn test_custom_binder() {
        let request = InternalRequest::new(Method::GET, "/a/b");
        let params = Params::new();
        let ctx = BindingContext::new(&request, &params);

        let PathText(path) = PathText::from_request(&ctx).unwrap();
        assert_eq!(path, "/a/b");
    }

    #[test]
    fn test_tuple_binds_all_or_fails() {
        let request = InternalRequest::new(Method::GET, "/x");
        let params = Params::new();
        let ctx = BindingContext::new(&request, &params);

        let (PathText(path), whole) = <(PathText, InternalRequest)>::from_request(&ctx).unwrap();
        assert_eq!(path, "/x");
        assert_eq!(whole.id(), request.id());

        let err = <(PathText, Failing)>::from_request(&ctx).err().unwrap();
        assert!(err.is_missing());
    }

    #[test]
    fn test_unit_always_binds() {
        let request = InternalRequest::new(Method::GET, "/");
        let params = Params::new();
        assert!(<()>::from_request(&BindingContext::new(&request, &params)).is_ok());
    }
}
