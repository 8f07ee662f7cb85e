use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::error::BrnError;

/// Where log lines go. The dashboard owns the terminal, so it logs to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

/// Filter precedence: `BRN_LOG`, then the config's `log.level`, then a
/// default picked by `verbose`.
fn build_filter(settings: &Settings, verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "brn=debug,borane_client=debug,borane_core=debug,warn"
    } else {
        "warn"
    };

    EnvFilter::try_from_env("BRN_LOG")
        .ok()
        .or_else(|| {
            settings
                .log_filter
                .as_deref()
                .and_then(|level| EnvFilter::try_new(level).ok())
        })
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

pub fn init_logging(settings: &Settings, target: LogTarget, verbose: bool) -> Result<(), BrnError> {
    let writer = match target {
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::File => {
            if let Some(parent) = settings.log_file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&settings.log_file)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(settings, verbose))
        .with_writer(writer)
        .with_target(true)
        .with_ansi(target == LogTarget::Stderr)
        .try_init()
        .map_err(|e| BrnError::Logging(e.to_string()))
}
