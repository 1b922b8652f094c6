//! CLI argument definitions for the gocall toolchain.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for function listings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ListFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Comma-separated values with a header row.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

/// Static call graph analysis for Go modules.
///
/// Configuration flags (`--config-path`, `--log-filter`, `--log-format`,
/// `--vendor-dir`, `--threads`) must come before the command.
#[derive(Parser, Debug)]
#[command(name = "gocall", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Analysis to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub(crate) struct ProjectArgs {
    /// Directory inside the Go module to analyse.
    #[arg(value_name = "DIR", default_value = ".")]
    pub(crate) root: Utf8PathBuf,
    /// Index `_test.go` files as well.
    #[arg(long)]
    pub(crate) tests: bool,
    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub(crate) output: Option<Utf8PathBuf>,
}

/// Structured subcommands for the gocall CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Renders the call graph as Graphviz DOT.
    Graph {
        #[command(flatten)]
        project: ProjectArgs,
        /// Only draw project functions.
        #[arg(long)]
        hide_external: bool,
    },
    /// Lists every function with its signature and callees.
    List {
        #[command(flatten)]
        project: ProjectArgs,
        /// Listing format.
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
    /// Prints the call sites of each function, nested calls indented.
    Calls {
        #[command(flatten)]
        project: ProjectArgs,
        /// Only show functions matching this identity or name.
        #[arg(long, value_name = "NAME")]
        function: Option<String>,
    },
    /// Lists functions that a coverage profile never executed.
    Untested {
        #[command(flatten)]
        project: ProjectArgs,
        /// Profile written by `go test -coverprofile`.
        #[arg(long, value_name = "FILE")]
        coverage: Utf8PathBuf,
        /// Listing format.
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
}

impl CliCommand {
    /// Options shared by every command.
    pub(crate) const fn project(&self) -> &ProjectArgs {
        match self {
            Self::Graph { project, .. }
            | Self::List { project, .. }
            | Self::Calls { project, .. }
            | Self::Untested { project, .. } => project,
        }
    }
}
