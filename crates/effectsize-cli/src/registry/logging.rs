use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;

use super::{RegistryError, RegistryResult};

/// Install the process-wide subscriber for one run.
///
/// Every event goes to `logs.ndjson` as JSON, with the fields of the
/// enclosing `run` span (run id, command) attached. Warnings and errors are
/// also echoed to stderr. `RUST_LOG` sets the level, `info` by default.
pub fn init_run_logging(logs_path: &Path) -> RegistryResult<()> {
    let file = OpenOptions::new().create(true).append(true).open(logs_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(Mutex::new(file));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr.with_max_level(Level::WARN));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))
}
