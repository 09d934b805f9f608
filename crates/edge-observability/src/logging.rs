//! Structured log lines tagged with the worker version.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use edge_core::{LifecycleObserver, RequestId, WorkerState};
use serde::Serialize;
use serde_json::Value;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Upper-case label used by the human format.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How records are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// `[LEVEL] worker: message | k=v` for terminals.
    Human,
}

/// One rendered log line before formatting.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    /// Worker version tag, e.g. `apexnos-v1.0.0`.
    pub worker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Extra fields, flattened into the JSON object.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
    /// Microseconds since the logger was created.
    pub elapsed_us: u64,
}

impl LogRecord {
    /// Render in the given format.
    pub fn render(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Json => {
                serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
            }
            LogFormat::Human => {
                let mut line = format!("[{}] {}: {}", self.level, self.worker, self.message);
                if let Some(ref id) = self.request_id {
                    line.push_str(&format!(" req={}", id));
                }
                if !self.fields.is_empty() {
                    let pairs: Vec<String> =
                        self.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    line.push_str(" | ");
                    line.push_str(&pairs.join(" "));
                }
                line
            }
        }
    }
}

/// Destination for rendered lines.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes to stderr, which the host captures.
#[derive(Debug, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Logger bound to one worker version and, optionally, one request.
pub struct StructuredLogger {
    worker: String,
    request_id: Option<RequestId>,
    created: Instant,
    min_level: LogLevel,
    format: LogFormat,
    sink: Arc<dyn LogSink>,
}

impl StructuredLogger {
    /// JSON logger at `Info` writing to stderr.
    pub fn new(worker: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            request_id: None,
            created: Instant::now(),
            min_level: LogLevel::Info,
            format: LogFormat::Json,
            sink: Arc::new(StderrSink),
        }
    }

    pub fn with_request(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Start a record. Nothing is written until [`Entry::emit`].
    pub fn entry(&self, level: LogLevel, message: impl Into<String>) -> Entry<'_> {
        Entry {
            logger: self,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    fn write(&self, level: LogLevel, message: String, fields: BTreeMap<String, Value>) {
        if level < self.min_level {
            return;
        }

        let record = LogRecord {
            level,
            message,
            worker: self.worker.clone(),
            request_id: self.request_id.as_ref().map(ToString::to_string),
            fields,
            elapsed_us: self.created.elapsed().as_micros() as u64,
        };
        self.sink.write_line(&record.render(self.format));
    }
}

impl fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("worker", &self.worker)
            .field("request_id", &self.request_id)
            .field("min_level", &self.min_level)
            .field("format", &self.format)
            .finish()
    }
}

/// A record under construction.
#[must_use = "entries are only written by `emit`"]
pub struct Entry<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, Value>,
}

impl Entry<'_> {
    pub fn str(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_string(), Value::String(value.into()));
        self
    }

    pub fn num(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), Value::from(value));
        self
    }

    /// Record a duration in whole milliseconds.
    pub fn millis(self, key: &str, duration: Duration) -> Self {
        self.num(key, duration.as_millis() as u64)
    }

    pub fn emit(self) {
        self.logger.write(self.level, self.message, self.fields);
    }
}

/// Lifecycle observer writing one record per transition.
#[derive(Debug)]
pub struct LifecycleLogger {
    logger: StructuredLogger,
}

impl LifecycleLogger {
    pub fn new(logger: StructuredLogger) -> Self {
        Self { logger }
    }
}

impl LifecycleObserver for LifecycleLogger {
    fn on_transition(&self, from: WorkerState, to: WorkerState, elapsed: Duration) {
        // Only an active worker is superseded; anything earlier was discarded.
        let (level, message) = if to == WorkerState::Redundant && from != WorkerState::Active {
            (LogLevel::Warn, "worker discarded")
        } else {
            (LogLevel::Info, "worker state changed")
        };

        self.logger
            .entry(level, message)
            .str("from", from.to_string())
            .str("to", to.to_string())
            .millis("since_start_ms", elapsed)
            .emit();
    }
}
