//! Centralized logging for blockprobe.
//!
//! Provides thread-safe leveled logging with a category tag per line.
//! Lines go to stderr so stdout stays reserved for command output.

use std::io::Write;
use std::sync::{Mutex, OnceLock};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose diagnostics, including every external command executed
    Debug = 0,
    /// Informational messages about normal operation
    Info = 1,
    /// Warning messages about potential issues
    Warning = 2,
    /// Error messages about failures
    Error = 3,
}

impl LogLevel {
    /// Get the prefix string for this log level
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Local>,
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

impl LogEntry {
    /// Format the log entry as a structured line:
    /// `[HH:MM:SS] [LEVEL] CATEGORY: message`
    pub fn format(&self) -> String {
        format!(
            "[{}] [{}] {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.level.prefix(),
            self.category,
            self.message
        )
    }
}

/// Where formatted lines end up.
enum Sink {
    Stderr,
    #[cfg(test)]
    Memory(Vec<LogEntry>),
}

/// Global logger instance
struct Logger {
    min_level: LogLevel,
    sink: Sink,
}

impl Logger {
    fn new() -> Self {
        Self {
            min_level: parse_log_level(crate::constants::DEFAULT_LOG_LEVEL),
            sink: Sink::Stderr,
        }
    }

    fn log(&mut self, level: LogLevel, category: &str, message: String) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            timestamp: chrono::Local::now(),
            level,
            category: category.to_string(),
            message,
        };

        match &mut self.sink {
            Sink::Stderr => {
                let _ = writeln!(std::io::stderr().lock(), "{}", entry.format());
            }
            #[cfg(test)]
            Sink::Memory(entries) => entries.push(entry),
        }
    }
}

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<Logger> {
    LOGGER.get_or_init(|| Mutex::new(Logger::new()))
}

/// Log a message with the specified level and category
pub fn log(level: LogLevel, category: &str, message: impl Into<String>) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.log(level, category, message.into());
    }
}

/// Set the minimum log level.
///
/// Call once at startup: `Debug` when `--debug` is given, otherwise the default.
pub fn set_min_level(level: LogLevel) {
    if let Ok(mut logger) = get_logger().lock() {
        logger.min_level = level;
    }
}

/// Parse a log level string (case-insensitive) into a `LogLevel`.
///
/// Falls back to `LogLevel::Info` for unrecognised values.
#[must_use]
pub fn parse_log_level(s: &str) -> LogLevel {
    match s.trim().to_ascii_lowercase().as_str() {
        "debug" => LogLevel::Debug,
        "warning" | "warn" => LogLevel::Warning,
        "error" | "err" => LogLevel::Error,
        _ => LogLevel::Info,
    }
}

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Debug, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Info, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Warning, $category, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::logger::log($crate::logger::LogLevel::Error, $category, format!($($arg)*))
    };
}
