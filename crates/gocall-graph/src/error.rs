//! Error types for call graph operations.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use gocall_syntax::SyntaxError;

/// Fatal errors returned by the analysis pipeline.
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    /// No `go.mod` exists in the start directory or any of its ancestors.
    #[error("no go.mod found in {start} or any parent directory")]
    ManifestNotFound {
        /// Directory the upward search started from.
        start: Utf8PathBuf,
    },

    /// The `go.mod` file lacks a usable `module` directive.
    #[error("{path} has no module directive")]
    ManifestInvalid {
        /// Path of the offending manifest.
        path: Utf8PathBuf,
    },

    /// The project root cannot be read.
    #[error("cannot access project root {path}: {source}")]
    RootInaccessible {
        /// Root that was requested.
        path: Utf8PathBuf,
        /// Underlying error wrapped in Arc for Clone support.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The coverage profile cannot be opened.
    #[error("cannot open coverage profile {path}: {source}")]
    CoverageProfileOpen {
        /// Profile path that was requested.
        path: Utf8PathBuf,
        /// Underlying error wrapped in Arc for Clone support.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {message}")]
    WorkerPool {
        /// Description of the failure.
        message: String,
    },

    /// The Go grammar could not be loaded.
    #[error("parser unavailable: {0}")]
    Parser(Arc<SyntaxError>),

    /// The requested node was not found in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),
}

impl GraphError {
    /// Creates a new `ManifestNotFound` error.
    #[must_use]
    pub fn manifest_not_found(start: impl Into<Utf8PathBuf>) -> Self {
        Self::ManifestNotFound {
            start: start.into(),
        }
    }

    /// Creates a new `ManifestInvalid` error.
    #[must_use]
    pub fn manifest_invalid(path: impl Into<Utf8PathBuf>) -> Self {
        Self::ManifestInvalid { path: path.into() }
    }

    /// Creates a new `RootInaccessible` error.
    #[must_use]
    pub fn root_inaccessible(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::RootInaccessible {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new `CoverageProfileOpen` error.
    #[must_use]
    pub fn coverage_profile_open(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::CoverageProfileOpen {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new `WorkerPool` error.
    #[must_use]
    pub fn worker_pool(message: impl Into<String>) -> Self {
        Self::WorkerPool {
            message: message.into(),
        }
    }

    /// Creates a new `NodeNotFound` error.
    #[must_use]
    pub fn node_not_found(node_id: impl Into<String>) -> Self {
        Self::NodeNotFound(node_id.into())
    }
}

impl From<SyntaxError> for GraphError {
    fn from(error: SyntaxError) -> Self {
        Self::Parser(Arc::new(error))
    }
}
