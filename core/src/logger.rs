use std::fmt::{self, Display};
use std::sync::{Mutex, OnceLock};

use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};

/// Global logger instance
static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Severity of a log message, used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Debug,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "[ERROR]"),
            Severity::Warn => write!(f, "[WARN]"),
            Severity::Info => write!(f, "[INFO]"),
            Severity::Debug => write!(f, "[DEBUG]"),
        }
    }
}

/// A structured log message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: Severity,
    pub msg: String,
}

impl Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level, self.msg)
    }
}

/// Logger operating mode
#[derive(Debug, Clone)]
enum LoggerMode {
    /// Standalone mode: logs directly to stderr
    Standalone,
    /// Embedded mode: logs through channel communication, for hosts that
    /// own the terminal (the TUI)
    Embedded(Sender<LogMessage>),
}

/// Process-wide logging sink with a switchable backend.
pub struct Logger {
    mode: Mutex<LoggerMode>,
}

impl Logger {
    fn new_standalone() -> Self {
        Logger {
            mode: Mutex::new(LoggerMode::Standalone),
        }
    }

    fn new_embedded(sender: Sender<LogMessage>) -> Self {
        Logger {
            mode: Mutex::new(LoggerMode::Embedded(sender)),
        }
    }

    pub fn log(&self, level: Severity, msg: String) {
        let message = LogMessage { level, msg };
        if let Ok(mode) = self.mode.lock() {
            match &*mode {
                LoggerMode::Standalone => eprintln!("{message}"),
                LoggerMode::Embedded(sender) => {
                    // A gone receiver just means the UI shut down first.
                    let _ = sender.send(message);
                }
            }
        }
    }

    pub fn debug(&self, msg: String) {
        self.log(Severity::Debug, msg);
    }

    pub fn info(&self, msg: String) {
        self.log(Severity::Info, msg);
    }

    pub fn warn(&self, msg: String) {
        self.log(Severity::Warn, msg);
    }

    pub fn error(&self, msg: String) {
        self.log(Severity::Error, msg);
    }
}

/// Initialize the global logger in standalone mode
pub fn init_standalone() {
    let _ = GLOBAL_LOGGER.set(Logger::new_standalone());
}

/// Initialize the global logger in embedded mode
pub fn init_embedded(sender: Sender<LogMessage>) {
    let _ = GLOBAL_LOGGER.set(Logger::new_embedded(sender));
}

/// Create a logging channel pair
pub fn create_log_channel() -> (Sender<LogMessage>, Receiver<LogMessage>) {
    unbounded()
}

/// Get the global logger instance
pub fn get_logger() -> &'static Logger {
    GLOBAL_LOGGER.get_or_init(Logger::new_standalone)
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logger::get_logger().debug(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::get_logger().info(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::get_logger().warn(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::get_logger().error(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_logger_ships_messages_down_the_channel() {
        let (tx, rx) = create_log_channel();
        let logger = Logger::new_embedded(tx);
        logger.info("connected".to_string());
        logger.error("lost".to_string());

        assert_eq!(
            rx.try_recv().unwrap(),
            LogMessage {
                level: Severity::Info,
                msg: "connected".to_string()
            }
        );
        let second = rx.try_recv().unwrap();
        assert_eq!(second.level, Severity::Error);
        assert_eq!(second.to_string(), "[ERROR] lost");
    }

    #[test]
    fn logging_survives_a_dropped_receiver() {
        let (tx, rx) = create_log_channel();
        let logger = Logger::new_embedded(tx);
        drop(rx);
        logger.warn("nobody listening".to_string());
    }
}
