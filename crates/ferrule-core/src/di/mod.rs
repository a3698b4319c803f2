//! Dependency injection.
//!
//! Services are bound once at startup in a [`ServiceRegistry`]. Each
//! request resolves them through its own [`InstanceProvider`] scope:
//!
//! - [`Lifetime::Transient`] bindings produce a new instance on every
//!   resolution.
//! - [`Lifetime::Scoped`] bindings produce one instance per scope.
//! - Types implementing [`Injectable`] can be built without a binding; their
//!   unbound dependencies are built recursively.
//!
//! Building can register the dependencies it discovered as transient
//! bindings. [`InstanceProvider::plan`] performs the same walk without
//! constructing anything, so that side effect can be inspected and applied
//! explicitly with [`InstanceProvider::commit`].

mod descriptor;
mod error;
mod injectable;
mod plan;
mod provider;
mod registry;

pub use descriptor::{ErasedFactory, ErasedInstance, Lifetime, ServiceDescriptor, ServiceKey};
pub use error::{BoxError, DiError, DiResult};
pub use injectable::{Arguments, Dependency, Injectable};
pub use plan::{NewBinding, PlanAction, PlanStep, ResolutionPlan};
pub use provider::{InstanceProvider, ProviderOptions};
pub use registry::ServiceRegistry;
