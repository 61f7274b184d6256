use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError};

const LOG_FILE_NAME: &str = "gatorkeys.log";

/// Where log lines go. The chat shell owns the terminal, so it logs to a file.
#[derive(Debug, Clone, Copy)]
pub enum LogSink<'a> {
    Stderr,
    File(&'a Path),
}

pub fn init(config: &LogConfig, sink: LogSink<'_>) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match sink {
        LogSink::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(AppError::LoggingInit),
        LogSink::File(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(LOG_FILE_NAME)
                .build(dir)
                .map_err(|error| AppError::LoggingInit(Box::new(error)))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(appender)
                .try_init()
                .map_err(AppError::LoggingInit)
        }
    }
}
