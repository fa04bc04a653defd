//! Logging bridge that forwards core log records to a host-provided logger.

use std::sync::{Arc, OnceLock};

/// Trait representing a logger that can receive log messages from the core.
///
/// Hosts embedding the core (the wasm bindings, or a native shell through the
/// `ffi` feature) implement this to route records into their own logging.
///
/// # Examples
///
/// ```rust
/// use confirmkit_core::logger::{Logger, LogLevel};
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{:?}] {}", level, message);
///     }
/// }
/// ```
#[cfg_attr(feature = "ffi", uniffi::export(with_foreign))]
pub trait Logger: Sync + Send {
    /// Logs a message at the specified log level.
    fn log(&self, level: LogLevel, message: String);
}

/// Enumeration of possible log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
pub enum LogLevel {
    /// Designates very low priority, often extremely detailed messages.
    Trace,
    /// Designates lower priority debugging information.
    Debug,
    /// Designates informational messages that highlight the progress of the application.
    Info,
    /// Designates potentially harmful situations.
    Warn,
    /// Designates error events that might still allow the application to continue running.
    Error,
}

/// Forwards `log` records to the registered [`Logger`].
struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if !should_forward(record.level(), record.module_path()) {
            return;
        }

        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(log_level(record.level()), format!("{}", record.args()));
        } else {
            eprintln!("Logger not set: {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Debug and trace records are only forwarded when they come from this
/// project's crates; other levels always are.
fn should_forward(level: log::Level, module_path: Option<&str>) -> bool {
    let is_from_confirmkit =
        module_path.is_some_and(|module_path| module_path.starts_with("confirmkit"));
    let is_debug_or_trace = level == log::Level::Debug || level == log::Level::Trace;
    is_from_confirmkit || !is_debug_or_trace
}

/// Converts a `log::Level` to a [`LogLevel`].
#[must_use]
pub const fn log_level(level: log::Level) -> LogLevel {
    match level {
        log::Level::Error => LogLevel::Error,
        log::Level::Warn => LogLevel::Warn,
        log::Level::Info => LogLevel::Info,
        log::Level::Debug => LogLevel::Debug,
        log::Level::Trace => LogLevel::Trace,
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Sets the global logger.
///
/// Only the first call installs a logger; later calls are reported and ignored.
#[cfg_attr(feature = "ffi", uniffi::export)]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("Logger already set");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("Failed to set logger: {e}");
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(log::Level::Debug, Some("confirmkit_core::host::button"), true ; "own debug")]
    #[test_case(log::Level::Trace, Some("confirmkit_wasm"), true ; "own trace from bindings")]
    #[test_case(log::Level::Debug, Some("wasm_bindgen::convert"), false ; "foreign debug")]
    #[test_case(log::Level::Warn, Some("serde_json"), true ; "foreign warning")]
    #[test_case(log::Level::Trace, None, false ; "unknown module")]
    fn test_filtering(level: log::Level, module: Option<&str>, forwarded: bool) {
        assert_eq!(should_forward(level, module), forwarded);
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(log_level(log::Level::Warn), LogLevel::Warn);
        assert_eq!(log_level(log::Level::Trace), LogLevel::Trace);
    }
}
