//! Logging setup shared by the executables
//!
//! Log lines go to stdout and to the session log file, prefixed with the seconds elapsed since
//! the session epoch and a coloured level tag. Debug and trace lines also carry the module path,
//! which is noisy at info level.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::fmt::Arguments;
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must include INFO, found {0}")]
    LevelTooLow(LevelFilter),

    #[error("Could not open the log file: {0}")]
    LogFileError(std::io::Error),

    #[error("Could not install the logger, has it already been set? ({0})")]
    InstallError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution. Must only be called once, after the session has
/// been created.
///
/// `min_level` must be `Info` or more verbose, so start-up messages are never lost.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::LevelTooLow(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileError)?;

    fern::Dispatch::new()
        .format(format_line)
        .level(min_level)
        // zmq is chatty at debug
        .level_for("zmq", LevelFilter::Info)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::InstallError)?;

    info!("Logging initialised at {:?}", min_level);
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Prefix each line with the session time and level. Debug and trace also name the module.
fn format_line(out: fern::FormatCallback, message: &Arguments, record: &Record) {
    let elapsed_s = session::get_elapsed_seconds();
    let tag = level_tag(record.level());

    if record.level() > Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            elapsed_s,
            tag,
            record.target(),
            message
        ))
    } else {
        out.finish(format_args!("[{:10.6} {}] {}", elapsed_s, tag, message))
    }
}

/// Three letter tag for a level
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}
