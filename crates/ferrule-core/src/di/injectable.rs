//! Constructor descriptors for auto-built types.

use super::descriptor::{accepts, downcast, erase, ErasedInstance, ServiceKey};
use super::plan::Planner;
use super::{DiError, DiResult, InstanceProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// A type the container can construct on its own.
///
/// Instead of inspecting constructor signatures at runtime, a type lists its
/// constructor parameters in [`dependencies`](Self::dependencies) and
/// receives them, resolved, in [`construct`](Self::construct).
///
/// # Example
///
/// ```
/// use ferrule_core::di::{Arguments, Dependency, DiResult, Injectable, ServiceRegistry};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Clock;
/// ferrule_core::injectable!(Clock);
///
/// struct Greeter {
///     clock: Arc<Clock>,
///     greeting: String,
/// }
///
/// impl Injectable for Greeter {
///     fn dependencies() -> Vec<Dependency> {
///         vec![
///             Dependency::service::<Clock>("clock"),
///             Dependency::value("greeting", String::from("hello")),
///         ]
///     }
///
///     fn construct(args: &ferrule_core::di::Arguments) -> DiResult<Self> {
///         Ok(Self {
///             clock: args.service("clock")?,
///             greeting: args.value("greeting")?,
///         })
///     }
/// }
///
/// let scope = ServiceRegistry::new().create_scope();
/// let greeter = scope.build::<Greeter>().unwrap();
/// assert_eq!(greeter.greeting, "hello");
/// assert!(scope.is_bound::<Clock>());
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Constructor parameters, in declaration order.
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// Builds the value from resolved arguments.
    ///
    /// # Errors
    ///
    /// Constructors report their own failures with
    /// [`DiError::instantiation`].
    fn construct(args: &Arguments) -> DiResult<Self>;
}

/// Implements [`Injectable`] for types with no dependencies via `Default`.
#[macro_export]
macro_rules! injectable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::di::Injectable for $ty {
                fn construct(_: &$crate::di::Arguments) -> $crate::di::DiResult<Self> {
                    Ok(<$ty as ::core::default::Default>::default())
                }
            }
        )+
    };
}

pub(crate) type BuildFn = fn(&InstanceProvider) -> DiResult<ErasedInstance>;
pub(crate) type PlanFn = fn(&InstanceProvider, &mut Planner) -> DiResult<()>;

#[derive(Clone, Copy)]
pub(crate) struct Buildable {
    pub(crate) build: BuildFn,
    pub(crate) plan: PlanFn,
}

impl Buildable {
    fn of<U: Injectable>() -> Self {
        Self {
            build: build_erased::<U>,
            plan: plan_erased::<U>,
        }
    }
}

fn build_erased<U: Injectable>(provider: &InstanceProvider) -> DiResult<ErasedInstance> {
    provider.build::<U>().map(|value| erase(Arc::new(value)))
}

fn plan_erased<U: Injectable>(provider: &InstanceProvider, planner: &mut Planner) -> DiResult<()> {
    planner.visit::<U>(provider)
}

#[derive(Clone)]
pub(crate) enum DependencyKind {
    Service {
        key: ServiceKey,
        optional: bool,
        accepts: fn(&ErasedInstance) -> bool,
        buildable: Option<Buildable>,
    },
    Value {
        default: Option<ErasedInstance>,
        variadic: bool,
    },
}

/// One constructor parameter.
#[derive(Clone)]
pub struct Dependency {
    name: &'static str,
    pub(crate) kind: DependencyKind,
}

impl Dependency {
    /// A concrete service the container may build if it is not bound.
    #[must_use]
    pub fn service<U: Injectable>(name: &'static str) -> Self {
        Self {
            name,
            kind: DependencyKind::Service {
                key: ServiceKey::of::<U>(),
                optional: false,
                accepts: accepts::<U>,
                buildable: Some(Buildable::of::<U>()),
            },
        }
    }

    /// A service that must be bound, such as a trait object.
    #[must_use]
    pub fn bound<U: ?Sized + Send + Sync + 'static>(name: &'static str) -> Self {
        Self {
            name,
            kind: DependencyKind::Service {
                key: ServiceKey::of::<U>(),
                optional: false,
                accepts: accepts::<U>,
                buildable: None,
            },
        }
    }

    /// Marks a service dependency optional: left empty when unbound.
    #[must_use]
    pub fn optional(mut self) -> Self {
        if let DependencyKind::Service { optional, .. } = &mut self.kind {
            *optional = true;
        }
        self
    }

    /// A plain value with a declared default.
    #[must_use]
    pub fn value<V: Clone + Send + Sync + 'static>(name: &'static str, default: V) -> Self {
        Self {
            name,
            kind: DependencyKind::Value {
                default: Some(erase(Arc::new(default))),
                variadic: false,
            },
        }
    }

    /// A variadic parameter, always supplied as an empty `Vec<V>`.
    #[must_use]
    pub fn variadic<V: Clone + Send + Sync + 'static>(name: &'static str) -> Self {
        Self {
            name,
            kind: DependencyKind::Value {
                default: Some(erase(Arc::new(Vec::<V>::new()))),
                variadic: true,
            },
        }
    }

    /// A plain value with no default. The container cannot supply it.
    #[must_use]
    pub fn required_value(name: &'static str) -> Self {
        Self {
            name,
            kind: DependencyKind::Value {
                default: None,
                variadic: false,
            },
        }
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The service this parameter asks for, if it is a service.
    #[must_use]
    pub fn service_key(&self) -> Option<ServiceKey> {
        match &self.kind {
            DependencyKind::Service { key, .. } => Some(*key),
            DependencyKind::Value { .. } => None,
        }
    }

    /// Whether the parameter may be left empty.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(&self.kind, DependencyKind::Service { optional: true, .. })
    }
}

impl std::fmt::Debug for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Dependency");
        s.field("name", &self.name);
        match &self.kind {
            DependencyKind::Service { key, optional, buildable, .. } => s
                .field("service", &key.type_name())
                .field("optional", optional)
                .field("buildable", &buildable.is_some()),
            DependencyKind::Value { default, variadic } => s
                .field("has_default", &default.is_some())
                .field("variadic", variadic),
        };
        s.finish()
    }
}

/// Resolved constructor arguments, looked up by parameter name.
#[derive(Debug)]
pub struct Arguments {
    owner: &'static str,
    values: HashMap<&'static str, Option<ErasedInstance>>,
}

impl Arguments {
    pub(crate) fn new(
        owner: &'static str,
        values: HashMap<&'static str, Option<ErasedInstance>>,
    ) -> Self {
        Self { owner, values }
    }

    /// A required service argument.
    ///
    /// # Errors
    ///
    /// Fails if the parameter was not declared, was left empty, or holds
    /// another type.
    pub fn service<U: ?Sized + Send + Sync + 'static>(&self, name: &'static str) -> DiResult<Arc<U>> {
        self.optional_service(name)?
            .ok_or(DiError::UnresolvableDependency {
                owner: self.owner,
                parameter: name,
            })
    }

    /// An optional service argument.
    pub fn optional_service<U: ?Sized + Send + Sync + 'static>(
        &self,
        name: &'static str,
    ) -> DiResult<Option<Arc<U>>> {
        let slot = self.values.get(name).ok_or(DiError::UndeclaredArgument {
            owner: self.owner,
            parameter: name,
        })?;
        match slot {
            None => Ok(None),
            Some(instance) => downcast::<U>(instance)
                .map(Some)
                .ok_or(DiError::TypeMismatch {
                    type_name: std::any::type_name::<U>(),
                }),
        }
    }

    /// A plain value argument.
    pub fn value<V: Clone + Send + Sync + 'static>(&self, name: &'static str) -> DiResult<V> {
        self.service::<V>(name).map(|value| (*value).clone())
    }

    /// A variadic argument.
    pub fn variadic<V: Clone + Send + Sync + 'static>(&self, name: &'static str) -> DiResult<Vec<V>> {
        self.value::<Vec<V>>(name)
    }

    /// The type being constructed.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }
}
