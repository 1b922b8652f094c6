//! Command-line interface runtime for the gocall toolchain.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! installation and output rendering. The runtime is exercised both from the
//! binary entrypoint and from tests where configuration loading and IO
//! streams can be substituted.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

use camino::Utf8Path;
use clap::Parser;
use clap::error::ErrorKind;
use gocall_config::Config;
use gocall_graph::{CoverageReport, analyze_coverage};
use tracing::info;

mod analysis;
mod calls;
mod cli;
mod config;
mod dot;
mod errors;
mod export;
pub mod telemetry;

use analysis::Analysis;
use cli::{Cli, CliCommand};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use config::{command_arguments, split_config_arguments};
pub(crate) use errors::AppError;

pub use cli::ListFormat;
pub use dot::{DotOptions, escape_label, render_dot, sanitize_identifier};
pub use export::{FunctionRecord, function_records, quote_csv_field, write_csv, write_table};

const CLI_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::run");

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

enum Parsed {
    Command(Cli),
    Informational(ExitCode),
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);

        let result = self.parse(command_arguments(&args, &split)).and_then(|parsed| match parsed {
            Parsed::Informational(exit_code) => Ok(exit_code),
            Parsed::Command(cli) => {
                let config = self.loader.load(&split.config_arguments)?;
                telemetry::initialise(&config)?;
                self.execute(&cli.command, &config).map(|()| ExitCode::SUCCESS)
            }
        });

        match result {
            Ok(exit_code) => exit_code,
            Err(error) => {
                // A failed diagnostic write leaves nothing else to report to.
                drop(writeln!(self.io.stderr, "{error}"));
                ExitCode::FAILURE
            }
        }
    }

    fn parse(&mut self, arguments: Vec<OsString>) -> Result<Parsed, AppError> {
        match Cli::try_parse_from(arguments) {
            Ok(cli) => Ok(Parsed::Command(cli)),
            Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                write!(self.io.stdout, "{}", error.render()).map_err(AppError::WriteOutput)?;
                Ok(Parsed::Informational(ExitCode::SUCCESS))
            }
            Err(error) => Err(AppError::CliUsage(error)),
        }
    }

    fn execute(&mut self, command: &CliCommand, config: &Config) -> Result<(), AppError> {
        let project_args = command.project();
        let analysis = Analysis::run(config, project_args)?;
        let mut rendered: Vec<u8> = Vec::new();

        match command {
            CliCommand::Graph { hide_external, .. } => {
                let options = DotOptions {
                    show_external: config.show_external && !hide_external,
                };
                render_dot(&analysis.graph(), options, &mut rendered).map_err(AppError::WriteOutput)?;
            }
            CliCommand::List { format, .. } => {
                let records = function_records(&analysis.project, &analysis.resolution);
                export::write_records(&records, *format, &mut rendered)?;
            }
            CliCommand::Calls { function, .. } => {
                let functions = calls::select_functions(&analysis.project, function.as_deref());
                if let Some(name) = function.as_deref()
                    && functions.is_empty()
                {
                    return Err(AppError::UnknownFunction(name.to_owned()));
                }
                calls::write_calls(&analysis.project, &analysis.resolution, &functions, &mut rendered)
                    .map_err(AppError::WriteOutput)?;
            }
            CliCommand::Untested {
                coverage, format, ..
            } => {
                let report = analyze_coverage(coverage, &analysis.project)?;
                let records = untested_records(&analysis, &report);
                export::write_records(&records, *format, &mut rendered)?;
            }
        }

        self.deliver(&rendered, project_args.output.as_deref())
    }

    fn deliver(&mut self, rendered: &[u8], output: Option<&Utf8Path>) -> Result<(), AppError> {
        match output {
            Some(path) => {
                fs::write(path, rendered).map_err(|source| AppError::WriteFile {
                    path: path.to_owned(),
                    source,
                })?;
                info!(target: CLI_TARGET, path = %path, bytes = rendered.len(), "output written");
                writeln!(self.io.stderr, "wrote {path}").map_err(AppError::WriteOutput)
            }
            None => {
                self.io.stdout.write_all(rendered).map_err(AppError::WriteOutput)?;
                self.io.stdout.flush().map_err(AppError::WriteOutput)
            }
        }
    }
}

fn untested_records(analysis: &Analysis, report: &CoverageReport) -> Vec<FunctionRecord> {
    let untested: BTreeSet<String> = report
        .untested()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    function_records(&analysis.project, &analysis.resolution)
        .into_iter()
        .filter(|record| untested.contains(&record.function))
        .collect()
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}
