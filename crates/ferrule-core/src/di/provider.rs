//! Per-request resolution scope.

use super::descriptor::{accepts, downcast, ErasedInstance, Lifetime, ServiceDescriptor, ServiceKey};
use super::injectable::DependencyKind;
use super::plan::{NewBinding, Planner, ResolutionPlan};
use super::{Arguments, DiError, DiResult, Injectable, ServiceRegistry};
use parking_lot::RwLock;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Behaviour switches for an [`InstanceProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderOptions {
    /// Register services discovered while building as transient bindings.
    pub auto_register: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            auto_register: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Resolve,
    Build,
}

thread_local! {
    static RESOLVING: RefCell<Vec<(Phase, ServiceKey)>> = const { RefCell::new(Vec::new()) };
}

/// Tracks the types being resolved on the current thread.
///
/// An auto-registered binding's factory rebuilds its own type, so a
/// resolution and a build of the same type may nest legitimately; only a
/// repeat within the same phase is a cycle.
struct ResolutionGuard;

impl ResolutionGuard {
    fn enter(phase: Phase, key: ServiceKey) -> DiResult<Self> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&(phase, key)) {
                let chain = stack
                    .iter()
                    .map(|(_, k)| k.type_name())
                    .chain(std::iter::once(key.type_name()))
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(DiError::CircularDependency { chain });
            }
            stack.push((phase, key));
            Ok(Self)
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Resolves and builds services for one scope.
///
/// A provider starts from a snapshot of a [`ServiceRegistry`]. Scoped
/// instances are cached in the provider, and bindings discovered by
/// [`build`](Self::build) are added to it, never to the registry.
/// Resolution takes `&self` and is safe to share between threads; scoped
/// caching is compare-and-set, so concurrent first resolutions all observe
/// the same instance.
pub struct InstanceProvider {
    descriptors: RwLock<HashMap<ServiceKey, ServiceDescriptor>>,
    options: ProviderOptions,
}

impl InstanceProvider {
    /// A scope over the registry's bindings.
    #[must_use]
    pub fn new(registry: &ServiceRegistry) -> Self {
        Self::with_options(registry, ProviderOptions::default())
    }

    /// A scope with explicit options.
    #[must_use]
    pub fn with_options(registry: &ServiceRegistry, options: ProviderOptions) -> Self {
        Self {
            descriptors: RwLock::new(registry.descriptors().clone()),
            options,
        }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> ProviderOptions {
        self.options
    }

    /// Whether `T` is bound in this scope.
    #[must_use]
    pub fn is_bound<T: ?Sized + 'static>(&self) -> bool {
        self.contains_key(&ServiceKey::of::<T>())
    }

    /// Whether `key` is bound in this scope.
    #[must_use]
    pub fn contains_key(&self, key: &ServiceKey) -> bool {
        self.descriptors.read().contains_key(key)
    }

    /// Number of bindings in this scope.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.read().len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.read().is_empty()
    }

    /// Resolves a bound service.
    ///
    /// # Errors
    ///
    /// - [`DiError::NotBound`] if `T` has no binding.
    /// - [`DiError::TypeMismatch`] if the factory produced another type.
    /// - [`DiError::CircularDependency`] if `T` is already being resolved.
    /// - Whatever the factory itself returns.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let instance = self.resolve_key(key, accepts::<T>)?;
        downcast::<T>(&instance).ok_or(DiError::TypeMismatch {
            type_name: key.type_name(),
        })
    }

    pub(crate) fn resolve_key(
        &self,
        key: ServiceKey,
        accepts: fn(&ErasedInstance) -> bool,
    ) -> DiResult<ErasedInstance> {
        let descriptor = self
            .descriptors
            .read()
            .get(&key)
            .cloned()
            .ok_or(DiError::NotBound {
                type_name: key.type_name(),
            })?;

        if let Some(instance) = descriptor.instance() {
            return Ok(Arc::clone(instance));
        }
        let Some(factory) = descriptor.factory() else {
            return Err(DiError::NotInstantiable {
                type_name: key.type_name(),
            });
        };

        let instance = {
            let _guard = ResolutionGuard::enter(Phase::Resolve, key)?;
            factory(self)?
        };
        if !accepts(&instance) {
            return Err(DiError::TypeMismatch {
                type_name: key.type_name(),
            });
        }

        if descriptor.lifetime() == Lifetime::Scoped {
            let mut descriptors = self.descriptors.write();
            if let Some(bound) = descriptors.get_mut(&key) {
                if let Some(existing) = bound.instance() {
                    return Ok(Arc::clone(existing));
                }
                bound.cache(Arc::clone(&instance));
                tracing::trace!(service = key.type_name(), "scoped instance cached");
            }
        }
        Ok(instance)
    }

    /// Constructs `T` from its declared dependencies.
    ///
    /// Bound dependencies are resolved. Unbound concrete dependencies are
    /// built recursively and, when [`ProviderOptions::auto_register`] is on,
    /// registered afterwards as transient bindings so later resolutions find
    /// them. `T` itself is never registered.
    ///
    /// # Errors
    ///
    /// - [`DiError::UnresolvableDependency`] for a value without default.
    /// - [`DiError::NotInstantiable`] for an unbound non-buildable service.
    /// - [`DiError::CircularDependency`] for a dependency cycle.
    /// - Whatever resolution or the constructor returns.
    pub fn build<T: Injectable>(&self) -> DiResult<T> {
        let key = ServiceKey::of::<T>();
        let _guard = ResolutionGuard::enter(Phase::Build, key)?;
        let owner = key.type_name();

        let mut values = HashMap::new();
        let mut discovered = Vec::new();
        for dependency in T::dependencies() {
            let parameter = dependency.name();
            let value = match dependency.kind {
                DependencyKind::Value { default, .. } => Some(
                    default.ok_or(DiError::UnresolvableDependency { owner, parameter })?,
                ),
                DependencyKind::Service {
                    key: dep,
                    optional,
                    accepts,
                    buildable,
                } => {
                    if self.contains_key(&dep) {
                        Some(self.resolve_key(dep, accepts)?)
                    } else if optional {
                        None
                    } else if let Some(buildable) = buildable {
                        let instance = (buildable.build)(self)?;
                        discovered.push(NewBinding::new(dep, buildable.build));
                        Some(instance)
                    } else {
                        return Err(DiError::NotInstantiable {
                            type_name: dep.type_name(),
                        });
                    }
                }
            };
            values.insert(parameter, value);
        }

        let instance = T::construct(&Arguments::new(owner, values))?;
        if self.options.auto_register {
            self.register(&discovered);
        }
        Ok(instance)
    }

    /// Resolves `T` if bound, otherwise builds it.
    pub fn resolve<T: Injectable>(&self) -> DiResult<Arc<T>> {
        if self.is_bound::<T>() {
            self.get::<T>()
        } else {
            self.build::<T>().map(Arc::new)
        }
    }

    /// Plans a build of `T` without constructing anything.
    ///
    /// # Errors
    ///
    /// Fails exactly where [`build`](Self::build) would fail for structural
    /// reasons. Constructor failures are not predicted.
    pub fn plan<T: Injectable>(&self) -> DiResult<ResolutionPlan> {
        let mut planner = Planner::new(ServiceKey::of::<T>());
        planner.visit::<T>(self)?;
        Ok(planner.finish())
    }

    /// Registers the bindings a plan discovered. Returns how many were new.
    pub fn commit(&self, plan: &ResolutionPlan) -> usize {
        self.register(plan.new_bindings())
    }

    fn register(&self, bindings: &[NewBinding]) -> usize {
        if bindings.is_empty() {
            return 0;
        }
        let mut descriptors = self.descriptors.write();
        let mut added = 0;
        for binding in bindings {
            if let Entry::Vacant(entry) = descriptors.entry(binding.key()) {
                entry.insert(binding.descriptor());
                added += 1;
                tracing::debug!(
                    service = binding.key().type_name(),
                    "registered transient binding for auto-built service"
                );
            }
        }
        added
    }
}

impl fmt::Debug for InstanceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceProvider")
            .field("service_count", &self.len())
            .field("options", &self.options)
            .finish()
    }
}
