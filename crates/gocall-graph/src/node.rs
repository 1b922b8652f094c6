//! Call graph node representation.

use std::fmt;

use camino::Utf8PathBuf;

use crate::descriptor::{FunctionDescriptor, FunctionId};

/// Unique identifier for a node in the call graph.
///
/// Internal nodes use the canonical function identity. Synthetic nodes carry
/// a `kind:` prefix; canonical identities never contain a colon, so the two
/// families cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Identifier of an indexed (or referenced but unindexed) function.
    #[must_use]
    pub fn function(id: &FunctionId) -> Self {
        Self(id.to_string())
    }

    /// Identifier of a synthetic node of `kind` keyed by `key`.
    #[must_use]
    pub fn synthetic(kind: NodeKind, key: &str) -> Self {
        Self(format!("{}:{key}", kind.as_str()))
    }

    /// Returns the string representation of this node ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// An indexed function or method.
    Internal,
    /// A resolved target that has no descriptor, e.g. from a skipped file.
    Unindexed,
    /// A method called on a value.
    Method,
    /// A function from a package outside the module.
    External,
    /// A function from a module package that was not indexed.
    Missing,
    /// A callee that could not be resolved at all.
    Unknown,
    /// An immediately invoked function literal.
    Literal,
}

impl NodeKind {
    /// Lower-case label, also used as the synthetic id prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Unindexed => "unindexed",
            Self::Method => "method",
            Self::External => "ext",
            Self::Missing => "missing",
            Self::Unknown => "unknown",
            Self::Literal => "literal",
        }
    }

    /// Whether the node stands for a function identity in the project.
    #[must_use]
    pub const fn is_function(self) -> bool {
        matches!(self, Self::Internal | Self::Unindexed)
    }
}

/// A node in the call graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallNode {
    id: NodeId,
    kind: NodeKind,
    label: String,
    package: Option<String>,
    receiver: Option<String>,
    file: Option<Utf8PathBuf>,
    line: Option<u32>,
}

impl CallNode {
    /// Node for an indexed function.
    #[must_use]
    pub fn internal(descriptor: &FunctionDescriptor) -> Self {
        Self {
            id: NodeId::function(descriptor.id()),
            kind: NodeKind::Internal,
            label: descriptor.id().qualified_name(),
            package: Some(descriptor.package().to_owned()),
            receiver: descriptor.receiver().map(str::to_owned),
            file: Some(descriptor.file.clone()),
            line: Some(descriptor.start_line),
        }
    }

    /// Placeholder for a resolved identity with no descriptor.
    #[must_use]
    pub fn unindexed(id: &FunctionId) -> Self {
        Self {
            id: NodeId::function(id),
            kind: NodeKind::Unindexed,
            label: id.qualified_name(),
            package: Some(id.package().to_owned()),
            receiver: id.receiver().map(str::to_owned),
            file: None,
            line: None,
        }
    }

    /// Synthetic node of `kind` keyed by `key` and shown as `label`.
    #[must_use]
    pub fn synthetic(kind: NodeKind, key: &str, label: impl Into<String>) -> Self {
        Self {
            id: NodeId::synthetic(kind, key),
            kind,
            label: label.into(),
            package: None,
            receiver: None,
            file: None,
            line: None,
        }
    }

    /// Returns the unique identifier for this node.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns what the node stands for.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Display name without the package.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Owning package for function nodes.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Receiver type for method nodes.
    #[must_use]
    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    /// Declaring file for indexed nodes.
    #[must_use]
    pub const fn file(&self) -> Option<&Utf8PathBuf> {
        self.file.as_ref()
    }

    /// Declaration line for indexed nodes.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    /// Fully qualified name: the canonical identity for function nodes, the
    /// label otherwise.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.kind.is_function() {
            self.id.to_string()
        } else {
            self.label.clone()
        }
    }
}
