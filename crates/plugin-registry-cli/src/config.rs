//! Splits configuration flags from `plugreg` arguments.
//!
//! Configuration flags are forwarded to `ortho-config`; everything from the
//! first other token onwards is parsed by the tool's own `clap` definition.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use plugin_registry_config::Config;

use crate::errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Must match the fields of [`Config`] plus `--config-path`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--plugin-dir",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered argument list.
    ///
    /// Configuration flags must appear before any tool arguments. A flag
    /// after the first tool argument is parsed as a tool argument.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    if !text.starts_with("--") {
        return FlagAction::Stop;
    }
    let (flag, has_inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !has_inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments after splitting: both lists keep the program name first.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) tool_arguments: Vec<OsString>,
}

pub(crate) fn split_arguments(args: Vec<OsString>) -> ArgumentSplit {
    let mut remaining = args.into_iter();
    let Some(program) = remaining.next() else {
        return ArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut tool_arguments = vec![program];
    let mut awaiting_value = false;
    for argument in remaining.by_ref() {
        if awaiting_value {
            config_arguments.push(argument);
            awaiting_value = false;
            continue;
        }
        match classify(&argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument);
                awaiting_value = needs_value;
            }
            FlagAction::Stop => {
                tool_arguments.push(argument);
                break;
            }
        }
    }
    tool_arguments.extend(remaining);

    ArgumentSplit {
        config_arguments,
        tool_arguments,
    }
}
