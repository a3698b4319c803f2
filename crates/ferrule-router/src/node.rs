//! Trie nodes stored in the router's arena.
//!
//! Nodes never own each other. A node refers to its children through
//! [`NodeId`] indices into the arena held by [`Router`](crate::Router), with
//! literal and parameter children kept in two separate maps so a literal and
//! a parameter of the same name can live side by side.

use indexmap::IndexMap;
use std::collections::HashMap;

/// Index of a node inside a router's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single path-segment node.
///
/// `H` is the handler value bound at a terminal node and `M` the middleware
/// value attached alongside it.
#[derive(Debug, Clone)]
pub struct Node<H, M> {
    name: String,
    is_parameter: bool,
    literal_children: HashMap<String, NodeId>,
    /// Registration order matters: it decides which parameter wins a tie.
    parameter_children: IndexMap<String, NodeId>,
    handler: Option<H>,
    middleware: Vec<M>,
}

impl<H, M> Node<H, M> {
    pub(crate) fn root() -> Self {
        Self::new(String::new(), false)
    }

    pub(crate) fn literal(name: String) -> Self {
        Self::new(name, false)
    }

    pub(crate) fn parameter(name: String) -> Self {
        Self::new(name, true)
    }

    fn new(name: String, is_parameter: bool) -> Self {
        Self {
            name,
            is_parameter,
            literal_children: HashMap::new(),
            parameter_children: IndexMap::new(),
            handler: None,
            middleware: Vec::new(),
        }
    }

    /// The literal token or parameter name. Empty for method roots.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this node captures a path parameter.
    #[must_use]
    pub fn is_parameter(&self) -> bool {
        self.is_parameter
    }

    /// The bound handler, if this node terminates a route.
    #[must_use]
    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    /// Middleware attached to this node's route, in declaration order.
    #[must_use]
    pub fn middleware(&self) -> &[M] {
        &self.middleware
    }

    /// Looks up a literal child by its lower-cased token.
    #[must_use]
    pub fn literal_child(&self, token: &str) -> Option<NodeId> {
        self.literal_children.get(token).copied()
    }

    /// Looks up a parameter child by name.
    #[must_use]
    pub fn parameter_child(&self, name: &str) -> Option<NodeId> {
        self.parameter_children.get(name).copied()
    }

    /// Parameter children in registration order.
    pub fn parameter_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.parameter_children.values().copied()
    }

    /// Number of direct children across both namespaces.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.literal_children.len() + self.parameter_children.len()
    }

    pub(crate) fn add_literal_child(&mut self, token: String, id: NodeId) {
        self.literal_children.insert(token, id);
    }

    pub(crate) fn add_parameter_child(&mut self, name: String, id: NodeId) {
        self.parameter_children.insert(name, id);
    }

    /// Binds the handler and appends middleware. Fails if a handler is
    /// already bound, leaving the node untouched.
    pub(crate) fn bind(
        &mut self,
        handler: H,
        middleware: impl IntoIterator<Item = M>,
    ) -> Result<(), H> {
        if self.handler.is_some() {
            return Err(handler);
        }
        self.handler = Some(handler);
        self.middleware.extend(middleware);
        Ok(())
    }
}
