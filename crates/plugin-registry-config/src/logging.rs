//! Log output formats accepted by the `log_format` setting.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How `plugreg` renders its tracing events on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Each load, skip and teardown event as one flattened JSON object per
    /// line, for collection by log shippers.
    #[default]
    Json,
    /// A terse `level target: message` line per event, for operators reading
    /// a terminal.
    Compact,
}

/// Returned when `--log-format` or `PLUGREG_LOG_FORMAT` names neither format.
pub type LogFormatParseError = strum::ParseError;
