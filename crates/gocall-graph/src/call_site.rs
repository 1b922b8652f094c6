//! Classified call sites.

use std::fmt;

use gocall_syntax::InvocationMode;

use crate::descriptor::FunctionId;

/// Where an unresolved call appears to lead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExternalOrigin {
    /// A bare identifier or computed callee with no registry entry.
    Unknown,
    /// A package inside the project module whose function was not indexed.
    Missing {
        /// Import path of the package.
        import_path: String,
    },
    /// A package outside the project module.
    Import {
        /// Import path of the package.
        import_path: String,
    },
}

impl ExternalOrigin {
    /// Import path for package-qualified origins.
    #[must_use]
    pub fn import_path(&self) -> Option<&str> {
        match self {
            Self::Unknown => None,
            Self::Missing { import_path } | Self::Import { import_path } => Some(import_path),
        }
    }
}

/// Classification of a call target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// A function in the caller's own package.
    Local(FunctionId),
    /// A function in another package of the project.
    CrossModule(FunctionId),
    /// A method invoked on a value; the receiver is not resolved to a type.
    Method {
        /// Source text of the receiver expression.
        receiver: String,
        /// Method name.
        method: String,
    },
    /// A call that does not resolve to an indexed function.
    External {
        /// Function name, or the callee's source text for computed targets.
        function: String,
        /// Where the call appears to lead.
        origin: ExternalOrigin,
    },
    /// An immediately invoked function literal.
    Literal,
}

impl CallKind {
    /// Resolved identity for local and cross-package calls.
    #[must_use]
    pub const fn target(&self) -> Option<&FunctionId> {
        match self {
            Self::Local(id) | Self::CrossModule(id) => Some(id),
            Self::Method { .. } | Self::External { .. } | Self::Literal => None,
        }
    }

    /// Short label naming the variant.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::CrossModule(_) => "cross-module",
            Self::Method { .. } => "method",
            Self::External {
                origin: ExternalOrigin::Unknown,
                ..
            } => "unknown",
            Self::External {
                origin: ExternalOrigin::Missing { .. },
                ..
            } => "missing",
            Self::External {
                origin: ExternalOrigin::Import { .. },
                ..
            } => "external",
            Self::Literal => "literal",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) | Self::CrossModule(id) => write!(f, "{id}"),
            Self::Method { receiver, method } => write!(f, "{receiver}.{method}"),
            Self::External { function, origin } => match origin.import_path() {
                Some(path) => write!(f, "{path}.{function}"),
                None => f.write_str(function),
            },
            Self::Literal => f.write_str("func literal"),
        }
    }
}

/// One classified call expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Target classification.
    pub kind: CallKind,
    /// One-based line of the call or its `defer`/`go` statement.
    pub line: u32,
    /// Full source text of the call expression.
    pub text: String,
    /// Argument expressions as written.
    pub arguments: Vec<String>,
    /// Calls found in the arguments, then in an invoked literal's body.
    pub nested: Vec<CallSite>,
    /// Scheduling mode.
    pub mode: InvocationMode,
}

impl CallSite {
    /// Visits this site and every nested site, depth first.
    pub fn visit<'a>(&'a self, visitor: &mut impl FnMut(&'a Self)) {
        visitor(self);
        for nested in &self.nested {
            nested.visit(visitor);
        }
    }

    /// This site followed by all nested sites, depth first.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Self> {
        let mut sites = Vec::new();
        self.visit(&mut |site| sites.push(site));
        sites
    }
}

/// Every site in `sites` and their nested sites, depth first.
#[must_use]
pub fn flatten_all(sites: &[CallSite]) -> Vec<&CallSite> {
    let mut flattened = Vec::new();
    for site in sites {
        site.visit(&mut |visited| flattened.push(visited));
    }
    flattened
}
