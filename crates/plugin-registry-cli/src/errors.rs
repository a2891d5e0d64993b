//! Error type for the `plugreg` runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to scan plugin directory '{path}': {source}")]
    ScanPluginDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialise creator listing: {0}")]
    SerialiseListing(serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
}
