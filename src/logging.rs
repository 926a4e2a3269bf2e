use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/book-sieve.log";

/// `-v` forces debug and `-vv` trace. Otherwise `TRACING_LEVEL` applies,
/// falling back to `info`.
fn filter_for(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::new(env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string())),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Directory and file name for the appender. A bare file name logs into
/// the working directory.
fn split_log_path(path: &Path) -> (PathBuf, OsString) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("book-sieve.log"));
    (dir, name)
}

/// Console plus plain-text file logging (`LOG_FILE_PATH`). Hold the
/// returned guard until exit so buffered file lines get flushed.
pub fn init_logger(verbosity: u8) -> impl Drop {
    let log_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (dir, name) = split_log_path(Path::new(&log_path));
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .compact()
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_target(false)
                .with_ansi(false),
        )
        .with(filter_for(verbosity))
        .init();

    debug!("Logging to {}", log_path);

    guard
}
