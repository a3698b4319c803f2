//! Service keys, lifetimes and descriptors.

use super::{DiResult, InstanceProvider};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased service instance.
///
/// The concrete value stored is always an `Arc<T>` for the bound type `T`,
/// which lets unsized types such as `dyn Trait` be bound as well.
pub type ErasedInstance = Arc<dyn Any + Send + Sync>;

/// A type-erased factory.
pub type ErasedFactory = Arc<dyn Fn(&InstanceProvider) -> DiResult<ErasedInstance> + Send + Sync>;

/// How long a resolved instance is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// A new instance on every resolution.
    #[default]
    Transient,
    /// One instance per provider scope, created on first resolution.
    Scoped,
}

/// Identifies a bound service by type.
#[derive(Debug, Clone, Copy)]
pub struct ServiceKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl ServiceKey {
    /// The key for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The type's name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

/// How to produce or reuse an instance of one service.
///
/// A descriptor always has a factory, a cached instance, or both.
#[derive(Clone)]
pub struct ServiceDescriptor {
    lifetime: Lifetime,
    factory: Option<ErasedFactory>,
    instance: Option<ErasedInstance>,
}

impl ServiceDescriptor {
    /// A descriptor backed by an erased factory.
    #[must_use]
    pub fn from_factory(lifetime: Lifetime, factory: ErasedFactory) -> Self {
        Self {
            lifetime,
            factory: Some(factory),
            instance: None,
        }
    }

    /// A descriptor backed by a typed factory.
    pub fn typed<T, F>(lifetime: Lifetime, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&InstanceProvider) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::from_factory(
            lifetime,
            Arc::new(move |provider| {
                factory(provider).map(|service| Arc::new(service) as ErasedInstance)
            }),
        )
    }

    /// A descriptor that always yields the same instance.
    #[must_use]
    pub fn from_instance(instance: ErasedInstance) -> Self {
        Self {
            lifetime: Lifetime::Scoped,
            factory: None,
            instance: Some(instance),
        }
    }

    /// The lifetime policy.
    #[must_use]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// The factory, if any.
    #[must_use]
    pub fn factory(&self) -> Option<&ErasedFactory> {
        self.factory.as_ref()
    }

    /// The cached instance, if any.
    #[must_use]
    pub fn instance(&self) -> Option<&ErasedInstance> {
        self.instance.as_ref()
    }

    pub(crate) fn cache(&mut self, instance: ErasedInstance) {
        self.instance = Some(instance);
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("lifetime", &self.lifetime)
            .field("has_factory", &self.factory.is_some())
            .field("cached", &self.instance.is_some())
            .finish()
    }
}

/// Wraps a typed instance for storage.
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> ErasedInstance {
    Arc::new(instance)
}

/// Recovers a typed instance.
pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(
    instance: &ErasedInstance,
) -> Option<Arc<T>> {
    instance.as_ref().downcast_ref::<Arc<T>>().cloned()
}

/// Whether an erased instance holds a `T`.
pub(crate) fn accepts<T: ?Sized + Send + Sync + 'static>(instance: &ErasedInstance) -> bool {
    instance.as_ref().is::<Arc<T>>()
}
