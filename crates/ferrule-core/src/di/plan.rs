//! Resolution plans.
//!
//! Planning walks the same dependency graph [`InstanceProvider::build`]
//! would, without constructing anything or touching the provider's
//! bindings. The result lists every decision and the transient bindings a
//! build would register, which can then be applied with
//! [`InstanceProvider::commit`].

use super::descriptor::{Lifetime, ServiceDescriptor, ServiceKey};
use super::injectable::{BuildFn, DependencyKind};
use super::{DiError, DiResult, Injectable, InstanceProvider};
use std::sync::Arc;

/// What the container does for one constructor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Use the parameter's declared default.
    UseDefault,
    /// Supply an empty sequence.
    EmptyVariadic,
    /// Resolve the bound service.
    Resolve,
    /// Leave the optional parameter empty.
    SkipOptional,
    /// Build the service and register it as transient.
    Build,
}

/// One planned decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    /// The type whose constructor declares the parameter.
    pub owner: &'static str,
    /// The parameter name.
    pub parameter: &'static str,
    /// The chosen action.
    pub action: PlanAction,
    /// The service involved, for service parameters.
    pub target: Option<&'static str>,
}

/// A binding a build would add.
#[derive(Clone, Copy)]
pub struct NewBinding {
    key: ServiceKey,
    build: BuildFn,
}

impl NewBinding {
    pub(crate) fn new(key: ServiceKey, build: BuildFn) -> Self {
        Self { key, build }
    }

    /// The service that would be bound.
    #[must_use]
    pub fn key(&self) -> ServiceKey {
        self.key
    }

    /// A transient descriptor that rebuilds the service on every resolution.
    #[must_use]
    pub fn descriptor(&self) -> ServiceDescriptor {
        let build = self.build;
        ServiceDescriptor::from_factory(Lifetime::Transient, Arc::new(move |provider| build(provider)))
    }
}

impl std::fmt::Debug for NewBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NewBinding").field(&self.key.type_name()).finish()
    }
}

/// The outcome of [`InstanceProvider::plan`].
#[derive(Debug, Clone)]
pub struct ResolutionPlan {
    root: ServiceKey,
    steps: Vec<PlanStep>,
    new_bindings: Vec<NewBinding>,
}

impl ResolutionPlan {
    /// The type the plan builds.
    #[must_use]
    pub fn root(&self) -> ServiceKey {
        self.root
    }

    /// Decisions in depth-first order.
    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Bindings a build would register, without duplicates.
    #[must_use]
    pub fn new_bindings(&self) -> &[NewBinding] {
        &self.new_bindings
    }

    /// Whether building changes the provider's bindings.
    #[must_use]
    pub fn has_side_effects(&self) -> bool {
        !self.new_bindings.is_empty()
    }
}

pub(crate) struct Planner {
    plan: ResolutionPlan,
    stack: Vec<ServiceKey>,
}

impl Planner {
    pub(crate) fn new(root: ServiceKey) -> Self {
        Self {
            plan: ResolutionPlan {
                root,
                steps: Vec::new(),
                new_bindings: Vec::new(),
            },
            stack: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> ResolutionPlan {
        self.plan
    }

    pub(crate) fn visit<T: Injectable>(&mut self, provider: &InstanceProvider) -> DiResult<()> {
        let key = ServiceKey::of::<T>();
        if self.stack.contains(&key) {
            let chain = self
                .stack
                .iter()
                .chain(std::iter::once(&key))
                .map(ServiceKey::type_name)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(DiError::CircularDependency { chain });
        }
        self.stack.push(key);
        let owner = key.type_name();

        for dependency in T::dependencies() {
            let parameter = dependency.name();
            let (action, target) = match &dependency.kind {
                DependencyKind::Value { default: None, .. } => {
                    return Err(DiError::UnresolvableDependency { owner, parameter });
                }
                DependencyKind::Value { variadic: true, .. } => (PlanAction::EmptyVariadic, None),
                DependencyKind::Value { .. } => (PlanAction::UseDefault, None),
                DependencyKind::Service { key: dep, optional, buildable, .. } => {
                    if provider.contains_key(dep) {
                        (PlanAction::Resolve, Some(dep.type_name()))
                    } else if *optional {
                        (PlanAction::SkipOptional, Some(dep.type_name()))
                    } else if let Some(buildable) = buildable {
                        self.plan.steps.push(PlanStep {
                            owner,
                            parameter,
                            action: PlanAction::Build,
                            target: Some(dep.type_name()),
                        });
                        (buildable.plan)(provider, self)?;
                        if !self.plan.new_bindings.iter().any(|b| b.key == *dep) {
                            self.plan.new_bindings.push(NewBinding::new(*dep, buildable.build));
                        }
                        continue;
                    } else {
                        return Err(DiError::NotInstantiable {
                            type_name: dep.type_name(),
                        });
                    }
                }
            };
            self.plan.steps.push(PlanStep {
                owner,
                parameter,
                action,
                target,
            });
        }

        self.stack.pop();
        Ok(())
    }
}
