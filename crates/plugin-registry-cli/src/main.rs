//! Entry point for the `plugreg` operator tool.
//!
//! Delegates to [`plugin_registry_cli::run`], which loads configuration,
//! installs telemetry, loads the requested plugin libraries, and lists the
//! creators they contribute.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    plugin_registry_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
