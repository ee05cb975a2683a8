use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/fingerprinter.log";

/// Colour stderr logs only for an interactive terminal, and never when
/// `NO_COLOR` is set to a non-empty value.
fn use_ansi(stderr_is_terminal: bool, no_color: Option<&str>) -> bool {
    stderr_is_terminal && no_color.map_or(true, str::is_empty)
}

/// Split `LOG_FILE_PATH` into the appender's directory and file name.
fn log_file_target(path: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(path);
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fingerprinter.log"));
    (directory, file_name)
}

/// Human-readable events on stderr plus a plain-text copy in the log file.
///
/// `TRACING_LEVEL` sets the filter (default `info`) and `LOG_FILE_PATH` the
/// file. The returned guard flushes the file writer when dropped.
pub fn init_logger() -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_file = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (directory, file_name) = log_file_target(&log_file);

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let ansi = use_ansi(
        std::io::stderr().is_terminal(),
        env::var("NO_COLOR").ok().as_deref(),
    );

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_ansi(ansi),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(EnvFilter::new(filter))
        .init();

    debug!("Logging to stderr (ansi: {}) and {}", ansi, log_file);

    guard
}
