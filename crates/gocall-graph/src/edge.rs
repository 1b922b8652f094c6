//! Call graph edge representation.

use std::fmt;

use gocall_syntax::InvocationMode;

use crate::call_site::CallKind;
use crate::node::NodeId;

/// Classification carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Call to a function in the same package.
    Local,
    /// Call to a function in another project package.
    CrossModule,
    /// Call to a method on a value.
    Method,
    /// Call that could not be resolved to an indexed function.
    External,
    /// Immediately invoked function literal.
    Literal,
}

impl EdgeKind {
    /// Edge kind for a call site classification.
    #[must_use]
    pub const fn for_call(kind: &CallKind) -> Self {
        match kind {
            CallKind::Local(_) => Self::Local,
            CallKind::CrossModule(_) => Self::CrossModule,
            CallKind::Method { .. } => Self::Method,
            CallKind::External { .. } => Self::External,
            CallKind::Literal => Self::Literal,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Local => "local",
            Self::CrossModule => "cross-module",
            Self::Method => "method",
            Self::External => "external",
            Self::Literal => "literal",
        };
        f.write_str(label)
    }
}

/// A directed caller to callee relationship.
///
/// Repeated calls between the same pair share one edge that remembers every
/// call line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEdge {
    caller: NodeId,
    callee: NodeId,
    kind: EdgeKind,
    lines: Vec<u32>,
    modes: Vec<InvocationMode>,
}

impl CallEdge {
    /// Creates a new call edge.
    #[must_use]
    pub const fn new(from_caller: NodeId, to_callee: NodeId, kind: EdgeKind) -> Self {
        Self {
            caller: from_caller,
            callee: to_callee,
            kind,
            lines: Vec::new(),
            modes: Vec::new(),
        }
    }

    /// Adds a call occurrence.
    #[must_use]
    pub fn with_call(mut self, line: u32, mode: InvocationMode) -> Self {
        self.record_call(line, mode);
        self
    }

    /// Records another call occurrence on this edge.
    pub fn record_call(&mut self, line: u32, mode: InvocationMode) {
        if let Err(position) = self.lines.binary_search(&line) {
            self.lines.insert(position, line);
        }
        if !self.modes.contains(&mode) {
            self.modes.push(mode);
        }
    }

    /// Returns the caller node ID.
    #[must_use]
    pub const fn caller(&self) -> &NodeId {
        &self.caller
    }

    /// Returns the callee node ID.
    #[must_use]
    pub const fn callee(&self) -> &NodeId {
        &self.callee
    }

    /// Returns the edge classification.
    #[must_use]
    pub const fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// Lines of every call along this edge, ascending.
    #[must_use]
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Returns whether any call along this edge uses `mode`.
    #[must_use]
    pub fn has_mode(&self, mode: InvocationMode) -> bool {
        self.modes.contains(&mode)
    }
}
