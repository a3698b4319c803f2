//! Dependency injection errors.

use thiserror::Error;

/// Boxed error produced by a failing constructor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while binding or resolving services.
///
/// Every variant is a wiring mistake rather than a request problem, so the
/// pipeline reports them as configuration errors.
#[derive(Debug, Error)]
pub enum DiError {
    /// Nothing is bound under this type.
    #[error("target binding [{type_name}] does not exist")]
    NotBound {
        /// The requested type.
        type_name: &'static str,
    },

    /// A binding for this type already exists.
    #[error("binding for [{type_name}] is already added")]
    AlreadyBound {
        /// The type bound twice.
        type_name: &'static str,
    },

    /// A factory produced something other than the bound type.
    #[error("implementation factory for [{type_name}] did not return an instance of that type")]
    TypeMismatch {
        /// The bound type.
        type_name: &'static str,
    },

    /// The type cannot be built by the container, only bound.
    #[error("target [{type_name}] is not instantiable")]
    NotInstantiable {
        /// The type that could not be built.
        type_name: &'static str,
    },

    /// A constructor parameter has no binding and no default.
    #[error("unresolvable dependency [{parameter}] in class {owner}")]
    UnresolvableDependency {
        /// The type being constructed.
        owner: &'static str,
        /// The parameter that could not be satisfied.
        parameter: &'static str,
    },

    /// A constructor asked for a parameter it never declared.
    #[error("{owner} requested undeclared argument `{parameter}`")]
    UndeclaredArgument {
        /// The type being constructed.
        owner: &'static str,
        /// The requested parameter.
        parameter: &'static str,
    },

    /// The constructor itself failed.
    #[error("instantiation of class [{type_name}] failed")]
    Instantiation {
        /// The type being constructed.
        type_name: &'static str,
        /// Why construction failed.
        #[source]
        source: BoxError,
    },

    /// Resolution re-entered a type it was already resolving.
    #[error("circular dependency detected: {chain}")]
    CircularDependency {
        /// The resolution chain, outermost first.
        chain: String,
    },
}

impl DiError {
    /// Wraps an arbitrary constructor failure.
    pub fn instantiation(type_name: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Instantiation {
            type_name,
            source: source.into(),
        }
    }
}

/// Result type for container operations.
pub type DiResult<T> = Result<T, DiError>;
