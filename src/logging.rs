//! File-based logging bootstrap.
//!
//! The terminal belongs to the UI, so log records go to
//! `<data_dir>/logs/todo.log` with size-based rotation. Messages follow a
//! stable `event=<name> module=<area> status=<ok|error>` layout.
//!
//! # Invariants
//! - Initialization is idempotent for the same directory.
//! - Initialization never panics.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;

use crate::error::AppError;

const LOG_FILE_BASENAME: &str = "todo";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

struct LoggingState {
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

/// Start file logging at `level` under `log_dir`.
///
/// # Errors
/// - `level` is not a valid log spec.
/// - `log_dir` cannot be created.
/// - Logging was already started in a different directory.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), AppError> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING_STATE.get() {
        if state.log_dir == log_dir {
            return Ok(());
        }
        return Err(AppError::Logging(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            state.log_dir.display(),
            log_dir.display()
        )));
    }

    std::fs::create_dir_all(log_dir).map_err(|err| {
        AppError::Logging(format!("failed to create log directory `{}`: {err}", log_dir.display()))
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| AppError::Logging(format!("invalid log level `{level}`: {err}")))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        // Unbuffered: one-shot commands exit through `process::exit`, which
        // skips the handle's destructor.
        .write_mode(WriteMode::Direct)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| AppError::Logging(format!("failed to start logger: {err}")))?;

    let state = LoggingState {
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    };
    if LOGGING_STATE.set(state).is_err() {
        return Ok(());
    }

    info!(
        "event=app_start module=core status=ok platform={} version={} level={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, AppError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "error" => Ok("error"),
        "warn" | "warning" => Ok("warn"),
        "info" => Ok("info"),
        "debug" => Ok("debug"),
        "trace" => Ok("trace"),
        "off" => Ok("off"),
        other => Err(AppError::Logging(format!("unsupported log level `{other}`"))),
    }
}
