//! High-level router API.
//!
//! This module provides the main [`Router`] struct which is the primary
//! interface for registering and resolving routes.

use http::Method;

use crate::error::{RouteError, RouteResult};
use crate::method::RouteMethod;
use crate::node::{Node, NodeId};
use crate::params::Params;
use crate::segment::{normalize_path, parse_template, split, Segment};
use crate::RouteMatch;

/// A path-segment trie router with one root per HTTP method.
///
/// Nodes live in a flat arena and refer to each other by index, so a built
/// router is plain data: share it behind an `Arc` and resolve from as many
/// requests as you like.
///
/// # Example
///
/// ```rust
/// use ferrule_router::Router;
/// use http::Method;
///
/// let mut router: Router<&str> = Router::new();
///
/// router.get("/users", "listUsers", []).unwrap();
/// router.post("/users", "createUser", []).unwrap();
/// router.get("/users/{id}", "getUser", []).unwrap();
///
/// let matched = router.resolve(&Method::GET, "/users/123").unwrap();
/// assert_eq!(*matched.handler, "getUser");
/// assert_eq!(matched.params.get("id"), Some("123"));
/// ```
///
/// # Route Priority
///
/// 1. **Literal segments** (e.g., `/users/me`)
/// 2. **Parameter segments** (e.g., `/users/{id}`), earliest registered first
///
/// A literal child that matches the current segment is the only candidate
/// at that level; parameter children are tried only when no literal exists.
#[derive(Debug, Clone)]
pub struct Router<H, M = ()> {
    /// Node arena. The first nine entries are the method roots.
    nodes: Vec<Node<H, M>>,
    /// Root node per method, indexed by [`RouteMethod`].
    roots: [NodeId; 9],
    /// Number of routes registered
    route_count: usize,
}

impl<H, M> Default for Router<H, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, M> Router<H, M> {
    /// Creates a router with an empty root for every method.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(RouteMethod::ALL.len() * 2);
        let roots = RouteMethod::ALL.map(|_| {
            nodes.push(Node::root());
            NodeId(nodes.len() - 1)
        });
        Self {
            nodes,
            roots,
            route_count: 0,
        }
    }

    /// Registers a route.
    ///
    /// The template is split on `/`; `{name}` segments become parameters
    /// and every other segment is stored lower-cased. Middleware is appended
    /// to the terminal node in the order given.
    ///
    /// # Errors
    ///
    /// - [`RouteError::MethodNotRoutable`] for methods outside
    ///   `GET, POST, PUT, PATCH, DELETE`
    /// - [`RouteError::EmptySegment`] when an interior segment is empty
    /// - [`RouteError::DuplicateRoute`] when a handler is already bound;
    ///   the trie is left exactly as it was
    pub fn add_route(
        &mut self,
        method: RouteMethod,
        template: &str,
        handler: H,
        middleware: impl IntoIterator<Item = M>,
    ) -> RouteResult<()> {
        if !method.is_registrable() {
            return Err(RouteError::MethodNotRoutable { method });
        }
        let segments = parse_template(template)?;

        let mut current = self.roots[method.index()];
        for segment in segments {
            current = match self.find_child(current, &segment) {
                Some(child) => child,
                None => self.attach(current, segment),
            };
        }

        // A bound handler means every node on the path already existed, so
        // rejecting here leaves the trie unchanged.
        self.nodes[current.0]
            .bind(handler, middleware)
            .map_err(|_| RouteError::DuplicateRoute {
                method,
                path: template.to_string(),
            })?;
        self.route_count += 1;
        Ok(())
    }

    /// Registers a `GET` route.
    pub fn get(
        &mut self,
        template: &str,
        handler: H,
        middleware: impl IntoIterator<Item = M>,
    ) -> RouteResult<()> {
        self.add_route(RouteMethod::Get, template, handler, middleware)
    }

    /// Registers a `POST` route.
    pub fn post(
        &mut self,
        template: &str,
        handler: H,
        middleware: impl IntoIterator<Item = M>,
    ) -> RouteResult<()> {
        self.add_route(RouteMethod::Post, template, handler, middleware)
    }

    /// Registers a `PUT` route.
    pub fn put(
        &mut self,
        template: &str,
        handler: H,
        middleware: impl IntoIterator<Item = M>,
    ) -> RouteResult<()> {
        self.add_route(RouteMethod::Put, template, handler, middleware)
    }

    /// Registers a `PATCH` route.
    pub fn patch(
        &mut self,
        template: &str,
        handler: H,
        middleware: impl IntoIterator<Item = M>,
    ) -> RouteResult<()> {
        self.add_route(RouteMethod::Patch, template, handler, middleware)
    }

    /// Registers a `DELETE` route.
    pub fn delete(
        &mut self,
        template: &str,
        handler: H,
        middleware: impl IntoIterator<Item = M>,
    ) -> RouteResult<()> {
        self.add_route(RouteMethod::Delete, template, handler, middleware)
    }

    /// Resolves a request method and path to its route.
    ///
    /// Methods without a route root resolve to [`RouteError::NotFound`].
    ///
    /// # Errors
    ///
    /// - [`RouteError::MalformedPath`] when the path has an empty segment
    ///   and more than one segment overall
    /// - [`RouteError::NotFound`] when the walk fails or ends on a node
    ///   without a handler
    pub fn resolve(&self, method: &Method, path: &str) -> RouteResult<RouteMatch<'_, H, M>> {
        match RouteMethod::from_http(method) {
            Some(method) => self.resolve_method(method, path),
            None => Err(RouteError::NotFound {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Resolves against a specific method root.
    pub fn resolve_method(
        &self,
        method: RouteMethod,
        path: &str,
    ) -> RouteResult<RouteMatch<'_, H, M>> {
        let not_found = || RouteError::NotFound {
            method: method.to_string(),
            path: path.to_string(),
        };

        let normalized = normalize_path(path);
        let segments = split(&normalized);
        let mut params = Params::new();

        let terminal = self
            .walk(self.roots[method.index()], &segments, 0, &mut params)
            .map_err(|()| RouteError::MalformedPath {
                path: path.to_string(),
            })?
            .ok_or_else(not_found)?;

        let node = &self.nodes[terminal.0];
        let handler = node.handler().ok_or_else(not_found)?;
        Ok(RouteMatch::new(handler, params, node.middleware()))
    }

    /// Depth-first walk. `Err(())` signals an unprocessable empty segment,
    /// `Ok(None)` a structural miss.
    fn walk(
        &self,
        id: NodeId,
        segments: &[&str],
        index: usize,
        params: &mut Params,
    ) -> Result<Option<NodeId>, ()> {
        let node = &self.nodes[id.0];
        if node.is_parameter() && index > 0 {
            params.insert(node.name(), segments[index - 1].to_lowercase());
        }

        let Some(segment) = segments.get(index) else {
            return Ok(Some(id));
        };
        if segment.is_empty() {
            return if segments.len() > 1 { Err(()) } else { Ok(Some(id)) };
        }

        let token = segment.to_lowercase();
        if let Some(child) = node.literal_child(&token) {
            return self.walk(child, segments, index + 1, params);
        }

        for child in node.parameter_children() {
            let mark = params.len();
            if let Some(found) = self.walk(child, segments, index + 1, params)? {
                return Ok(Some(found));
            }
            params.truncate(mark);
        }
        Ok(None)
    }

    fn find_child(&self, parent: NodeId, segment: &Segment) -> Option<NodeId> {
        let node = &self.nodes[parent.0];
        match segment {
            Segment::Literal(token) => node.literal_child(token),
            Segment::Parameter(name) => node.parameter_child(name),
        }
    }

    fn attach(&mut self, parent: NodeId, segment: Segment) -> NodeId {
        let id = NodeId(self.nodes.len());
        match segment {
            Segment::Literal(token) => {
                self.nodes.push(Node::literal(token.clone()));
                self.nodes[parent.0].add_literal_child(token, id);
            }
            Segment::Parameter(name) => {
                self.nodes.push(Node::parameter(name.clone()));
                self.nodes[parent.0].add_parameter_child(name, id);
            }
        }
        id
    }

    /// Root node of a method.
    #[must_use]
    pub fn root(&self, method: RouteMethod) -> NodeId {
        self.roots[method.index()]
    }

    /// Borrows a node from the arena.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<H, M>> {
        self.nodes.get(id.0)
    }

    /// Total nodes in the arena, method roots included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
