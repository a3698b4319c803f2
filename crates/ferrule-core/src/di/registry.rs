//! The startup service registry.

use super::descriptor::{erase, Lifetime, ServiceDescriptor, ServiceKey};
use super::{DiError, DiResult, InstanceProvider, ProviderOptions};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Service bindings collected at startup.
///
/// The registry is a template: every request gets its own
/// [`InstanceProvider`] scope created from it, so scoped instances and
/// bindings discovered while auto-building never leak between requests.
/// Instances bound with [`bind_instance`](Self::bind_instance) are the
/// exception and are shared by every scope.
///
/// # Example
///
/// ```
/// use ferrule_core::di::{ServiceRegistry, Lifetime};
/// use std::sync::Arc;
///
/// struct Database {
///     url: String,
/// }
///
/// let mut registry = ServiceRegistry::new();
/// registry
///     .bind_scoped(|_| Ok(Arc::new(Database { url: "postgres://localhost/app".into() })))
///     .unwrap();
///
/// let scope = registry.create_scope();
/// let first = scope.get::<Database>().unwrap();
/// let second = scope.get::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    descriptors: HashMap<ServiceKey, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `T` to a factory with the given lifetime.
    ///
    /// The factory receives the resolving provider so it can pull in its own
    /// dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`DiError::AlreadyBound`] if `T` is already bound.
    pub fn bind<T, F>(&mut self, lifetime: Lifetime, factory: F) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&InstanceProvider) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.bind_descriptor(
            ServiceKey::of::<T>(),
            ServiceDescriptor::typed(lifetime, factory),
        )
    }

    /// Binds `T` with [`Lifetime::Transient`].
    pub fn bind_transient<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&InstanceProvider) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.bind(Lifetime::Transient, factory)
    }

    /// Binds `T` with [`Lifetime::Scoped`].
    pub fn bind_scoped<T, F>(&mut self, factory: F) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&InstanceProvider) -> DiResult<Arc<T>> + Send + Sync + 'static,
    {
        self.bind(Lifetime::Scoped, factory)
    }

    /// Binds `T` to a fixed instance shared by every scope.
    pub fn bind_instance<T>(&mut self, instance: Arc<T>) -> DiResult<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.bind_descriptor(
            ServiceKey::of::<T>(),
            ServiceDescriptor::from_instance(erase(instance)),
        )
    }

    /// Binds a prepared descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DiError::AlreadyBound`] if the key is already bound.
    pub fn bind_descriptor(
        &mut self,
        key: ServiceKey,
        descriptor: ServiceDescriptor,
    ) -> DiResult<&mut Self> {
        if self.descriptors.contains_key(&key) {
            return Err(DiError::AlreadyBound {
                type_name: key.type_name(),
            });
        }
        tracing::trace!(service = key.type_name(), lifetime = ?descriptor.lifetime(), "service bound");
        self.descriptors.insert(key, descriptor);
        Ok(self)
    }

    /// Binds a descriptor, replacing whatever was bound before.
    pub fn replace_descriptor(
        &mut self,
        key: ServiceKey,
        descriptor: ServiceDescriptor,
    ) -> Option<ServiceDescriptor> {
        self.descriptors.insert(key, descriptor)
    }

    /// Returns true if `T` is bound.
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.descriptors.contains_key(&ServiceKey::of::<T>())
    }

    /// The descriptor bound under `key`.
    #[must_use]
    pub fn descriptor(&self, key: &ServiceKey) -> Option<&ServiceDescriptor> {
        self.descriptors.get(key)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Creates a fresh resolution scope with default options.
    #[must_use]
    pub fn create_scope(&self) -> InstanceProvider {
        InstanceProvider::new(self)
    }

    /// Creates a fresh resolution scope.
    #[must_use]
    pub fn create_scope_with(&self, options: ProviderOptions) -> InstanceProvider {
        InstanceProvider::with_options(self, options)
    }

    pub(crate) fn descriptors(&self) -> &HashMap<ServiceKey, ServiceDescriptor> {
        &self.descriptors
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("service_count", &self.descriptors.len())
            .finish()
    }
}
