//! Static call graph analysis for Go modules.
//!
//! The pipeline runs in four phases, each producing an immutable value that
//! the next phase consumes:
//!
//! 1. [`index`] walks the module, parses every source file in parallel and
//!    freezes a [`FunctionRegistry`] of canonical [`FunctionId`]s.
//! 2. [`resolve`] re-reads each function body and classifies every call site
//!    as local, cross-module, method, external or literal.
//! 3. [`assemble`] folds the resolved calls into a [`CallGraph`] with one
//!    node per function and deduplicated edges.
//! 4. [`analyze_coverage`] optionally matches a `go test -coverprofile`
//!    profile against the registry.
//!
//! Recoverable problems (unparseable files, duplicate identities, malformed
//! profile lines) are collected as [`Diagnostic`]s next to the results.
//! Only the failures listed on [`GraphError`] abort a run.
//!
//! # Example
//!
//! ```ignore
//! use camino::Utf8Path;
//! use gocall_graph::{IndexOptions, assemble, index, resolve};
//!
//! let project = index(Utf8Path::new("."), &IndexOptions::default())?;
//! let resolution = resolve(&project);
//! let graph = assemble(project.registry(), &resolution);
//! for node in graph.function_nodes() {
//!     println!("{}", node.qualified_name());
//! }
//! ```

mod assembler;
mod call_site;
mod coverage;
mod descriptor;
mod diagnostics;
mod edge;
mod error;
mod graph;
mod indexer;
mod manifest;
mod node;
mod pool;
mod registry;
mod resolver;

pub use assembler::assemble;
pub use call_site::{CallKind, CallSite, ExternalOrigin, flatten_all};
pub use coverage::{CoverageBlock, CoverageProfile, CoverageReport, analyze_coverage, is_covered};
pub use descriptor::{FunctionDescriptor, FunctionId};
pub use diagnostics::Diagnostic;
pub use edge::{CallEdge, EdgeKind};
pub use error::GraphError;
pub use graph::{CallGraph, Direction};
pub use indexer::{
    DEFAULT_VENDOR_DIR, IndexOptions, IndexedProject, SourceFile, discover_sources, index,
};
pub use manifest::{MANIFEST_FILE, ModuleManifest, parse_module_directive};
pub use node::{CallNode, NodeId, NodeKind};
pub use registry::{FunctionRegistry, RegistryBuilder};
pub use resolver::{Classifier, Resolution, resolve};

pub use gocall_syntax::InvocationMode;

pub(crate) const INDEX_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::indexer");
pub(crate) const RESOLVE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::resolver");
pub(crate) const GRAPH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::graph");
pub(crate) const COVERAGE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::coverage");

#[cfg(test)]
mod tests;
