//! Arena-backed route trie.
//!
//! # Layout
//! ```text
//! nodes: Vec<TrieNode>          NodeId(0) is the root
//! TrieNode
//!   ├── statics:  literal → NodeId
//!   ├── param:    Option<ParamEdge { name, constraint, node }>
//!   ├── wildcard: Option<NodeId>
//!   └── routes:   HttpMethod → CompiledRoute (terminal)
//! ```
//!
//! # Design Decisions
//! - One parameter edge and one wildcard edge per node; the first route to
//!   create an edge fixes its name and constraint
//! - Unregistering clears terminal slots only, nodes are never pruned

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::compiler::CompiledRoute;
use crate::routing::method::HttpMethod;
use crate::routing::segment::{Constraint, ParamSegment, RouteSegment};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The single parameter edge leaving a node.
#[derive(Debug, Clone)]
pub struct ParamEdge {
    pub name: String,
    pub constraint: Option<Constraint>,
    pub node: NodeId,
}

impl ParamEdge {
    /// Whether `segment` may bind to this parameter.
    pub fn accepts(&self, segment: &str) -> bool {
        match &self.constraint {
            Some(c) => c.is_match(segment),
            None => true,
        }
    }
}

#[derive(Debug, Default)]
pub struct TrieNode {
    statics: HashMap<String, NodeId>,
    param: Option<ParamEdge>,
    wildcard: Option<NodeId>,
    routes: HashMap<HttpMethod, Arc<CompiledRoute>>,
}

impl TrieNode {
    pub fn static_child(&self, segment: &str) -> Option<NodeId> {
        self.statics.get(segment).copied()
    }

    pub fn param_edge(&self) -> Option<&ParamEdge> {
        self.param.as_ref()
    }

    pub fn wildcard_child(&self) -> Option<NodeId> {
        self.wildcard
    }

    pub fn route(&self, method: HttpMethod) -> Option<&Arc<CompiledRoute>> {
        self.routes.get(&method)
    }
}

/// A trie of compiled routes.
#[derive(Debug)]
pub struct RouteTrie {
    nodes: Vec<TrieNode>,
    param_conflicts: usize,
}

impl Default for RouteTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            param_conflicts: 0,
        }
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.index()]
    }

    fn push_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TrieNode::default());
        id
    }

    /// Insert `compiled`, creating nodes along its segments as needed.
    pub fn insert(&mut self, compiled: &Arc<CompiledRoute>) {
        let mut current = NodeId::ROOT;
        for segment in &compiled.segments {
            current = match segment {
                RouteSegment::Static(literal) => self.static_or_insert(current, literal),
                RouteSegment::Parameter(param) => self.param_or_insert(current, param, compiled),
                RouteSegment::Wildcard => self.wildcard_or_insert(current),
            };
        }
        let method = compiled.route.method;
        self.nodes[current.index()]
            .routes
            .insert(method, Arc::clone(compiled));
    }

    fn static_or_insert(&mut self, parent: NodeId, literal: &str) -> NodeId {
        if let Some(id) = self.nodes[parent.index()].static_child(literal) {
            return id;
        }
        let id = self.push_node();
        self.nodes[parent.index()]
            .statics
            .insert(literal.to_string(), id);
        id
    }

    fn param_or_insert(
        &mut self,
        parent: NodeId,
        param: &ParamSegment,
        compiled: &CompiledRoute,
    ) -> NodeId {
        if let Some(edge) = &self.nodes[parent.index()].param {
            if edge.name != param.name || edge.constraint != param.constraint {
                tracing::warn!(
                    route = %compiled.key(),
                    existing = %edge.name,
                    existing_constraint = ?edge.constraint.as_ref().map(Constraint::source),
                    ignored = %param.name,
                    ignored_constraint = ?param.constraint.as_ref().map(Constraint::source),
                    "Parameter edge already defined at this position; keeping the first"
                );
                let node = edge.node;
                self.param_conflicts += 1;
                return node;
            }
            return edge.node;
        }
        let id = self.push_node();
        self.nodes[parent.index()].param = Some(ParamEdge {
            name: param.name.clone(),
            constraint: param.constraint.clone(),
            node: id,
        });
        id
    }

    fn wildcard_or_insert(&mut self, parent: NodeId) -> NodeId {
        if let Some(id) = self.nodes[parent.index()].wildcard {
            return id;
        }
        let id = self.push_node();
        self.nodes[parent.index()].wildcard = Some(id);
        id
    }

    /// Walk the route's own segments to its terminal node, without creating
    /// anything.
    fn terminal_of(&self, compiled: &CompiledRoute) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        for segment in &compiled.segments {
            let node = self.node(current);
            current = match segment {
                RouteSegment::Static(literal) => node.static_child(literal)?,
                RouteSegment::Parameter(_) => node.param_edge()?.node,
                RouteSegment::Wildcard => node.wildcard_child()?,
            };
        }
        Some(current)
    }

    /// Clear the terminal slot holding `compiled`. Nodes stay allocated.
    ///
    /// Returns false when the slot is absent or holds a different route.
    pub fn unregister(&mut self, compiled: &Arc<CompiledRoute>) -> bool {
        let Some(id) = self.terminal_of(compiled) else {
            return false;
        };
        let routes = &mut self.nodes[id.index()].routes;
        let method = compiled.route.method;
        let owned = routes
            .get(&method)
            .is_some_and(|existing| Arc::ptr_eq(existing, compiled));
        if owned {
            routes.remove(&method);
        }
        owned
    }

    /// Put `compiled` back into its terminal slot if that slot is empty.
    /// Never creates nodes.
    pub fn fill_vacant(&mut self, compiled: &Arc<CompiledRoute>) -> bool {
        let Some(id) = self.terminal_of(compiled) else {
            return false;
        };
        match self.nodes[id.index()].routes.entry(compiled.route.method) {
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(compiled));
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of terminal (node, method) slots.
    pub fn route_count(&self) -> usize {
        self.nodes.iter().map(|n| n.routes.len()).sum()
    }

    /// Parameter registrations that reused an edge with a different name or
    /// constraint.
    pub fn param_conflicts(&self) -> usize {
        self.param_conflicts
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(TrieNode::default());
        self.param_conflicts = 0;
    }
}
