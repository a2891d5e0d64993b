//! Runtime for the `plugreg` operator tool.
//!
//! `plugreg` loads configuration, installs telemetry, loads every library in
//! the configured plugin directory followed by the libraries named on the
//! command line, and lists the creators the registry then holds. Library
//! failures are collected through the registry's error recorder and written
//! to stderr.

use std::collections::HashMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::error::ErrorKind;
use plugin_registry::{
    BufferedErrorRecorder, LibraryHandle, PluginRegistry, Registry,
    discover_libraries,
};
use plugin_registry_config::Config;
use tracing::{debug, warn};

mod cli;
mod config;
mod errors;
mod listing;
pub mod telemetry;

use crate::cli::Cli;
use crate::config::{ConfigLoader, OrthoConfigLoader, split_arguments};
use crate::errors::AppError;
use crate::listing::{render_text, summarise};

/// Bundles the output streams handed to the runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

/// Runs `plugreg` with the given arguments and output streams.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams { stdout, stderr };
    run_with(args, &mut io, &OrthoConfigLoader, Registry::new())
}

pub(crate) fn run_with<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
    registry: Registry,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let split = split_arguments(args.into_iter().collect());

    let result = Cli::try_parse_from(split.tool_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            loader
                .load(&split.config_arguments)
                .map(|config| (cli, config))
        })
        .and_then(|(cli, config)| {
            telemetry::initialise(&config)?;
            execute(&cli, &config, &registry, &mut *io)
        });

    match result {
        Ok(exit_code) => exit_code,
        Err(AppError::CliUsage(error))
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            match write!(io.stdout, "{error}") {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        Err(error) => {
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W, E>(
    cli: &Cli,
    config: &Config,
    registry: &Registry,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError>
where
    W: Write,
    E: Write,
{
    let recorder = Arc::new(BufferedErrorRecorder::new());
    registry.set_error_recorder(Some(recorder.clone()));

    let mut paths = match config.plugin_dir() {
        Some(plugin_dir) => {
            let dir = plugin_dir.as_std_path();
            discover_libraries(dir).map_err(|source| AppError::ScanPluginDir {
                path: dir.to_path_buf(),
                source,
            })?
        }
        None => Vec::new(),
    };
    paths.extend(cli.libraries.iter().cloned());

    let mut loaded: HashMap<LibraryHandle, PathBuf> = HashMap::new();
    for path in paths {
        match registry.load_library(&path) {
            Some(handle) => {
                debug!(path = %path.display(), %handle, "library loaded");
                loaded.insert(handle, path);
            }
            None => warn!(path = %path.display(), "library skipped"),
        }
    }

    let failures = recorder.errors();
    for (code, description) in &failures {
        writeln!(io.stderr, "error[{code}]: {description}").map_err(AppError::WriteOutput)?;
    }

    let listing = summarise(&registry.get_plugin_creator_list(), &loaded, cli.fields);
    if cli.json {
        serde_json::to_writer_pretty(&mut *io.stdout, &listing)
            .map_err(AppError::SerialiseListing)?;
        writeln!(io.stdout).map_err(AppError::WriteOutput)?;
    } else {
        render_text(&listing, &mut *io.stdout).map_err(AppError::WriteOutput)?;
    }

    if failures.is_empty() || cli.keep_going {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
