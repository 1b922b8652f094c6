//! Runs the indexing and resolution phases for a command.

use gocall_config::Config;
use gocall_graph::{
    CallGraph, GraphError, IndexOptions, IndexedProject, Resolution, assemble, index, resolve,
};

use crate::cli::ProjectArgs;

/// An indexed project together with its resolved call sites.
pub(crate) struct Analysis {
    pub(crate) project: IndexedProject,
    pub(crate) resolution: Resolution,
}

impl Analysis {
    /// Indexes and resolves the project named by `args`.
    pub(crate) fn run(config: &Config, args: &ProjectArgs) -> Result<Self, GraphError> {
        let options = index_options(config, args);
        let project = index(&args.root, &options)?;
        let resolution = resolve(&project);
        Ok(Self {
            project,
            resolution,
        })
    }

    /// Folds the resolved calls into a graph.
    pub(crate) fn graph(&self) -> CallGraph {
        assemble(self.project.registry(), &self.resolution)
    }
}

/// Index settings from configuration, widened by command flags.
pub(crate) fn index_options(config: &Config, args: &ProjectArgs) -> IndexOptions {
    IndexOptions::default()
        .with_vendor_dir(config.vendor_dir())
        .with_tests(config.include_tests || args.tests)
        .with_threads(config.thread_count())
}
