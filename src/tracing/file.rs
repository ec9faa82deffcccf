use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

use super::filter::DebugOnlyFilter;
#[cfg(all(feature = "prod", not(feature = "dev")))]
use super::filter::ErrorOnlyFilter;
use super::filter::ErrorWarnFilter;
#[cfg(feature = "dev")]
use super::filter::InfoAndAboveFilter;
use super::format::FundtraceFormat;
use crate::Context;
use crate::Result;
use crate::config::LoggingConfig;
use crate::constants::DEFAULT_LOG_DIRECTORY;

// Writer guards must outlive the subscriber
static GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Installs the global subscriber: rolling debug and warn/error files under the
/// configured directory, plus a terminal layer picked by the `dev`/`prod` feature.
/// A second call is a no-op apart from a message on stderr.
pub fn setup_tracing(
    engine_name: &str,
    logging: &LoggingConfig,
) -> Result<()> {
    let base_logs_dir = Path::new(logging.directory.as_deref().unwrap_or(DEFAULT_LOG_DIRECTORY));

    for dir in [base_logs_dir.to_path_buf(), base_logs_dir.join("debug"), base_logs_dir.join("error")] {
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
    }

    let debug_appender =
        RollingFileAppender::new(Rotation::DAILY, base_logs_dir.join("debug"), format!("{}.log", engine_name));
    let error_appender =
        RollingFileAppender::new(Rotation::DAILY, base_logs_dir.join("error"), format!("{}.log", engine_name));

    let (non_blocking_debug, debug_guard) = tracing_appender::non_blocking(debug_appender);
    let (non_blocking_error, error_guard) = tracing_appender::non_blocking(error_appender);

    let format = FundtraceFormat {
        engine_name: engine_name.to_string(),
    };

    let subscriber = tracing_subscriber::registry()
        // DEBUG log file
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .event_format(format.clone())
                .with_writer(non_blocking_debug)
                .with_filter(DebugOnlyFilter),
        )
        // ERROR log file, warn and error
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .event_format(format.clone())
                .with_writer(non_blocking_error)
                .with_filter(ErrorWarnFilter),
        );

    #[cfg(feature = "dev")]
    let subscriber = subscriber.with(
        tracing_subscriber::fmt::Layer::default()
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .event_format(format.clone())
            .with_writer(std::io::stderr)
            .with_filter(InfoAndAboveFilter),
    );

    #[cfg(all(feature = "prod", not(feature = "dev")))]
    let subscriber = subscriber.with(
        tracing_subscriber::fmt::Layer::default()
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .event_format(format)
            .with_writer(std::io::stderr)
            .with_filter(ErrorOnlyFilter),
    );

    match tracing::subscriber::set_global_default(subscriber) {
        Ok(_) => {
            let _ = GUARDS.set(vec![debug_guard, error_guard]);
            tracing::info!(
                "{}_logging_started::debug_logs::{}",
                engine_name,
                base_logs_dir.join("debug").join(format!("{}.log", engine_name)).display()
            );
            tracing::info!(
                "{}_logging_started::error_logs::{}",
                engine_name,
                base_logs_dir.join("error").join(format!("{}.log", engine_name)).display()
            );
        },
        Err(e) => {
            eprintln!("Error setting up logging: {}", e);
        },
    }
    Ok(())
}
