//! Activity reporting sinks injected into each optimization run.

use parking_lot::Mutex;
use tracing::info;

/// Receives human-readable progress messages from the driver.
pub trait ActivityLogger: Send + Sync {
    fn add(&self, message: &str);
}

/// Forwards activity to `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingActivityLogger;

impl ActivityLogger for TracingActivityLogger {
    fn add(&self, message: &str) {
        info!(target: "optidrive::activity", "{}", message);
    }
}

/// Keeps every message in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryActivityLogger {
    entries: Mutex<Vec<String>>,
}

impl MemoryActivityLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ActivityLogger for MemoryActivityLogger {
    fn add(&self, message: &str) {
        self.entries.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_logger_keeps_order() {
        let logger = MemoryActivityLogger::new();
        assert!(logger.is_empty());

        logger.add("first");
        logger.add("second");

        assert_eq!(logger.len(), 2);
        assert_eq!(logger.entries(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn tracing_logger_accepts_messages() {
        TracingActivityLogger.add("no subscriber installed");
    }
}
