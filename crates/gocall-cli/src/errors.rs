//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use gocall_config::ConfigError;
use gocall_graph::GraphError;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Analysis(#[from] GraphError),
    #[error("no function matches '{0}'")]
    UnknownFunction(String),
    #[error("failed to serialise listing: {0}")]
    SerialiseListing(serde_json::Error),
    #[error("failed to write {path}: {source}")]
    WriteFile { path: Utf8PathBuf, source: io::Error },
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
