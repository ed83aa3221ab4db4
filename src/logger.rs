//! Custom logging module.
//!
//! This module provides a logger that formats log entries and forwards them
//! to a registered callback, e.g. the debug bubble of the app when the debug
//! level of the config is verbose.

use crate::app::MainApp;
use crate::error::{AppError, AppResult};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Callback receiving formatted log entries.
pub type LogCallback = Box<dyn Fn(String) + Send + Sync>;

/// Format a log record into a string for display
///
pub fn format_log(record: &Record) -> String {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let level_str = match record.level() {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    format!("{} {} {}", timestamp, level_str, record.args())
}

/// Log level for a debug level of the config options.
///
pub fn level_for_debug_level(debug_level: i64) -> LevelFilter {
    match debug_level {
        i64::MIN..=0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install `logger` as the global logger.
///
pub fn init_logger(logger: CustomLogger) -> AppResult<()> {
    let level = logger.level();
    log::set_boxed_logger(Box::new(logger)).map_err(|e| AppError::Logger(e.to_string()))?;
    log::set_max_level(level);
    Ok(())
}

/// Custom logger forwarding log entries to a callback
///
#[derive(Clone)]
pub struct CustomLogger {
    level: LevelFilter,
    log_callback: Arc<Mutex<Option<LogCallback>>>,
}

impl CustomLogger {
    pub fn new(level: LevelFilter) -> Self {
        CustomLogger {
            level,
            log_callback: Arc::new(Mutex::new(None)),
        }
    }

    /// Logger at the level of the app's debug level.
    ///
    pub fn for_app(app: &MainApp) -> Self {
        CustomLogger::new(level_for_debug_level(app.config().debug_level()))
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn set_log_callback(&self, callback: LogCallback) {
        if let Ok(mut guard) = self.log_callback.lock() {
            *guard = Some(callback);
        }
    }

    pub fn clear_log_callback(&self) {
        if let Ok(mut guard) = self.log_callback.lock() {
            *guard = None;
        }
    }

    /// Forward log entries to `bubble` if the app shows the debug bubble.
    /// Returns whether the bubble got connected.
    ///
    pub fn connect_bubble(&self, app: &MainApp, bubble: &DebugBubble) -> bool {
        if !app.debug_bubble() {
            return false;
        }
        self.set_log_callback(bubble.callback());
        true
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            if let Ok(callback) = self.log_callback.lock() {
                if let Some(ref cb) = *callback {
                    cb(format_log(record));
                }
            }
        }
    }

    fn flush(&self) {}
}

/// The most recent log entries, as shown in the debug bubble.
///
#[derive(Debug, Clone)]
pub struct DebugBubble {
    capacity: usize,
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl DebugBubble {
    pub fn new(capacity: usize) -> Self {
        DebugBubble {
            capacity,
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Callback appending entries to this bubble, dropping the oldest ones
    /// beyond its capacity.
    ///
    pub fn callback(&self) -> LogCallback {
        let lines = Arc::clone(&self.lines);
        let capacity = self.capacity;
        Box::new(move |line| {
            if let Ok(mut lines) = lines.lock() {
                if capacity == 0 {
                    return;
                }
                while lines.len() >= capacity {
                    lines.pop_front();
                }
                lines.push_back(line);
            }
        })
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.iter().cloned().collect(),
            Err(_) => vec![],
        }
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;
    use crate::events::EventHooks;
    use crate::state::StateSchema;
    use std::fs;
    use tempfile::TempDir;

    fn log_to(logger: &CustomLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .build(),
        );
    }

    fn app_with_debug_level(dir: &TempDir, debug_level: i64) -> MainApp {
        let path = dir.path().join("maio.ini");
        fs::write(&path, format!("[aeOptions]\ndebugLevel = {}\n", debug_level)).unwrap();
        let config = ConfigStore::with_files(&[path]).unwrap();
        MainApp::new(config, StateSchema::builtin(), EventHooks::new()).unwrap()
    }

    #[test]
    fn test_format_log_contains_level_and_message() {
        let line = format_log(
            &Record::builder()
                .args(format_args!("saved app state"))
                .level(Level::Warn)
                .build(),
        );
        assert!(line.ends_with(" WARN saved app state"));
    }

    #[test]
    fn test_level_for_debug_level() {
        assert_eq!(level_for_debug_level(-1), LevelFilter::Warn);
        assert_eq!(level_for_debug_level(0), LevelFilter::Warn);
        assert_eq!(level_for_debug_level(1), LevelFilter::Info);
        assert_eq!(level_for_debug_level(2), LevelFilter::Debug);
        assert_eq!(level_for_debug_level(9), LevelFilter::Trace);
    }

    #[test]
    fn test_logger_filters_by_level() {
        let bubble = DebugBubble::new(10);
        let logger = CustomLogger::new(LevelFilter::Info);
        logger.set_log_callback(bubble.callback());

        log_to(&logger, Level::Debug, "hidden");
        log_to(&logger, Level::Info, "shown");
        assert_eq!(bubble.lines().len(), 1);
        assert!(bubble.lines()[0].ends_with("INFO shown"));

        logger.clear_log_callback();
        log_to(&logger, Level::Error, "dropped");
        assert_eq!(bubble.lines().len(), 1);
    }

    #[test]
    fn test_bubble_keeps_latest_lines() {
        let bubble = DebugBubble::new(2);
        let callback = bubble.callback();
        for line in ["a", "b", "c"] {
            callback(line.to_string());
        }
        assert_eq!(bubble.lines(), vec!["b", "c"]);
        bubble.clear();
        assert!(bubble.lines().is_empty());
    }

    #[test]
    fn test_bubble_connects_on_verbose_debug_level() {
        let dir = TempDir::new().unwrap();
        let bubble = DebugBubble::new(5);

        let quiet = app_with_debug_level(&dir, 1);
        let logger = CustomLogger::for_app(&quiet);
        assert_eq!(logger.level(), LevelFilter::Info);
        assert!(!logger.connect_bubble(&quiet, &bubble));

        let verbose = app_with_debug_level(&dir, 2);
        let logger = CustomLogger::for_app(&verbose);
        assert!(logger.connect_bubble(&verbose, &bubble));
        log_to(&logger, Level::Debug, "context entered");
        assert_eq!(bubble.lines().len(), 1);
    }
}
