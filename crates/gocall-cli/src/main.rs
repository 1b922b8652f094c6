//! CLI entrypoint for the gocall call graph analyser.
//!
//! The binary delegates to [`gocall_cli::run`], which loads configuration,
//! parses the command, runs the analysis and writes the rendered output.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    gocall_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
