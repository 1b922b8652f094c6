//! Call graph structure with bidirectional indexing.

use std::collections::{HashMap, HashSet, VecDeque};

use gocall_syntax::InvocationMode;

use crate::edge::{CallEdge, EdgeKind};
use crate::error::GraphError;
use crate::node::{CallNode, NodeId};

/// Traversal direction for reachability queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow calls from caller to callee.
    Downstream,
    /// Follow calls from callee back to caller.
    Upstream,
}

/// A call graph with bidirectional indexing for efficient traversal.
///
/// Nodes live in a table keyed by [`NodeId`]; edges live in one vector and
/// both indices refer to them by position, so cycles need no shared
/// ownership.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    nodes: HashMap<NodeId, CallNode>,
    edges: Vec<CallEdge>,
    pair_index: HashMap<(NodeId, NodeId), usize>,
    callers_index: HashMap<NodeId, HashSet<usize>>,
    callees_index: HashMap<NodeId, HashSet<usize>>,
}

impl CallGraph {
    /// Creates a new empty call graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the graph.
    ///
    /// If a node with the same ID already exists, it is replaced.
    pub fn add_node(&mut self, node: CallNode) {
        let id = node.id().clone();
        self.nodes.insert(id.clone(), node);
        self.callers_index.entry(id.clone()).or_default();
        self.callees_index.entry(id).or_default();
    }

    /// Adds `node` unless a node with its ID exists; returns the ID.
    pub fn ensure_node(&mut self, node: CallNode) -> NodeId {
        let id = node.id().clone();
        if !self.nodes.contains_key(&id) {
            self.add_node(node);
        }
        id
    }

    /// Records a call from `caller` to `callee` at `line`.
    ///
    /// Both nodes must already be present; calls between absent nodes are
    /// ignored and reported as `false`. A repeated pair extends the existing
    /// edge with the new line instead of adding another edge.
    pub fn add_call(
        &mut self,
        caller: &NodeId,
        callee: &NodeId,
        kind: EdgeKind,
        line: u32,
        mode: InvocationMode,
    ) -> bool {
        if !self.nodes.contains_key(caller) || !self.nodes.contains_key(callee) {
            return false;
        }
        let key = (caller.clone(), callee.clone());
        if let Some(edge) = self
            .pair_index
            .get(&key)
            .copied()
            .and_then(|index| self.edges.get_mut(index))
        {
            edge.record_call(line, mode);
            return true;
        }

        let edge_index = self.edges.len();
        self.edges
            .push(CallEdge::new(caller.clone(), callee.clone(), kind).with_call(line, mode));
        self.pair_index.insert(key, edge_index);
        self.callees_index
            .entry(caller.clone())
            .or_default()
            .insert(edge_index);
        self.callers_index
            .entry(callee.clone())
            .or_default()
            .insert(edge_index);
        true
    }

    /// Returns the node with the given ID.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&CallNode> {
        self.nodes.get(id)
    }

    /// Returns an iterator over all nodes in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = &CallNode> {
        self.nodes.values()
    }

    /// Returns all nodes ordered by ID.
    #[must_use]
    pub fn sorted_nodes(&self) -> Vec<&CallNode> {
        let mut nodes: Vec<&CallNode> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }

    /// Nodes standing for project functions, ordered by ID.
    #[must_use]
    pub fn function_nodes(&self) -> Vec<&CallNode> {
        self.sorted_nodes()
            .into_iter()
            .filter(|node| node.kind().is_function())
            .collect()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns an iterator over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &CallEdge> {
        self.edges.iter()
    }

    /// Returns all edges ordered by caller then callee.
    #[must_use]
    pub fn sorted_edges(&self) -> Vec<&CallEdge> {
        let mut edges: Vec<&CallEdge> = self.edges.iter().collect();
        edges.sort_by(|a, b| (a.caller(), a.callee()).cmp(&(b.caller(), b.callee())));
        edges
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edges representing calls *to* the given node.
    pub fn incoming_edges(&self, node_id: &NodeId) -> impl Iterator<Item = &CallEdge> {
        self.callers_index
            .get(node_id)
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.edges.get(idx))
    }

    /// Returns the edges representing calls *from* the given node.
    pub fn outgoing_edges(&self, node_id: &NodeId) -> impl Iterator<Item = &CallEdge> {
        self.callees_index
            .get(node_id)
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.edges.get(idx))
    }

    /// Returns the nodes that call the given node.
    pub fn callers_of(&self, node_id: &NodeId) -> impl Iterator<Item = &CallNode> {
        self.incoming_edges(node_id)
            .filter_map(|edge| self.nodes.get(edge.caller()))
    }

    /// Returns the nodes that are called by the given node.
    pub fn callees_of(&self, node_id: &NodeId) -> impl Iterator<Item = &CallNode> {
        self.outgoing_edges(node_id)
            .filter_map(|edge| self.nodes.get(edge.callee()))
    }

    /// Every node reachable from `start` in `direction`, excluding `start`
    /// unless it lies on a cycle, ordered by ID.
    #[must_use]
    pub fn reachable(&self, start: &NodeId, direction: Direction) -> Vec<&CallNode> {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut queue: VecDeque<&NodeId> = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let next: Vec<&NodeId> = match direction {
                Direction::Downstream => self.outgoing_edges(current).map(CallEdge::callee).collect(),
                Direction::Upstream => self.incoming_edges(current).map(CallEdge::caller).collect(),
            };
            for id in next {
                if seen.insert(id) {
                    queue.push_back(id);
                }
            }
        }
        let mut reached: Vec<&CallNode> = seen
            .into_iter()
            .filter_map(|id| self.nodes.get(id))
            .collect();
        reached.sort_by(|a, b| a.id().cmp(b.id()));
        reached
    }

    /// Returns whether the graph contains a node with the given ID.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds a function node by canonical identity, qualified name or bare
    /// name, preferring the most specific match.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CallNode> {
        let functions = self.function_nodes();
        functions
            .iter()
            .find(|node| node.id().as_str() == name)
            .or_else(|| functions.iter().find(|node| node.label() == name))
            .or_else(|| {
                functions.iter().find(|node| {
                    node.label()
                        .rsplit('.')
                        .next()
                        .is_some_and(|bare| bare == name)
                })
            })
            .copied()
    }

    /// Returns the node with the given ID, or an error if not found.
    ///
    /// # Errors
    /// Returns `GraphError::NodeNotFound` if no node with the given ID exists.
    pub fn get_node(&self, id: &NodeId) -> Result<&CallNode, GraphError> {
        self.node(id)
            .ok_or_else(|| GraphError::node_not_found(id.as_str()))
    }
}
