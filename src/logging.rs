use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::domain::RunPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }
}

/// One line of the run log
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogRecord {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.timestamp.format("%H:%M:%S"),
            self.level.as_str(),
            self.message
        )
    }
}

/// Destination for run output. The GUI feeds a channel, tests capture to memory.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: LogRecord);

    /// Progress notifications; sinks that only show text can ignore them.
    fn phase(&self, _phase: RunPhase) {}
}

/// Handle used by the resolver and the orchestrator to write run output.
///
/// Every line is mirrored to `tracing` so a console build still shows it.
#[derive(Clone)]
pub struct RunLog {
    sink: Arc<dyn LogSink>,
}

impl RunLog {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message.into());
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.log(LogLevel::Critical, message.into());
    }

    pub fn phase(&self, phase: RunPhase) {
        tracing::debug!(?phase, "run phase changed");
        self.sink.phase(phase);
    }

    fn log(&self, level: LogLevel, message: String) {
        match level {
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Critical => tracing::error!(critical = true, "{}", message),
        }
        self.sink.emit(LogRecord::now(level, message));
    }
}

#[cfg(test)]
pub(crate) use testing::MemorySink;

#[cfg(test)]
mod testing {
    use std::sync::{Arc, Mutex};

    use super::{LogLevel, LogRecord, LogSink, RunLog};
    use crate::domain::RunPhase;

    /// Captures everything written to a `RunLog`
    #[derive(Default)]
    pub(crate) struct MemorySink {
        records: Mutex<Vec<LogRecord>>,
        phases: Mutex<Vec<RunPhase>>,
    }

    impl MemorySink {
        pub(crate) fn run_log() -> (Arc<Self>, RunLog) {
            let sink = Arc::new(Self::default());
            let log = RunLog::new(sink.clone());
            (sink, log)
        }

        pub(crate) fn records(&self) -> Vec<LogRecord> {
            self.records.lock().unwrap().clone()
        }

        pub(crate) fn messages_at(&self, level: LogLevel) -> Vec<String> {
            self.records()
                .into_iter()
                .filter(|r| r.level == level)
                .map(|r| r.message)
                .collect()
        }

        pub(crate) fn phases(&self) -> Vec<RunPhase> {
            self.phases.lock().unwrap().clone()
        }
    }

    impl LogSink for MemorySink {
        fn emit(&self, record: LogRecord) {
            self.records.lock().unwrap().push(record);
        }

        fn phase(&self, phase: RunPhase) {
            self.phases.lock().unwrap().push(phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_format() {
        let record = LogRecord::now(LogLevel::Warning, "cover forced on");
        let line = record.to_string();
        let parts: Vec<&str> = line.splitn(3, " - ").collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8); // HH:MM:SS
        assert_eq!(parts[1], "WARNING");
        assert_eq!(parts[2], "cover forced on");
    }

    #[test]
    fn test_run_log_forwards_levels_in_order() {
        let (sink, log) = MemorySink::run_log();
        log.info("a");
        log.warn("b");
        log.error("c");
        log.critical("d");

        let levels: Vec<LogLevel> = sink.records().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Info,
                LogLevel::Warning,
                LogLevel::Error,
                LogLevel::Critical
            ]
        );
        assert!(LogLevel::Critical > LogLevel::Error);
    }
}
