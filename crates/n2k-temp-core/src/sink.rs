//! Interfaces to the host: where metadata, values and status go.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

/// Descriptive metadata announced once per leaf path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMetadata {
    pub description: String,
    pub instance: u32,
    pub source: String,
    pub units: String,
}

/// Receives metadata announcements and value updates.
///
/// The two calls are independent. Implementations must not make a value
/// wait on a metadata announcement.
pub trait DeltaSink {
    /// Announce metadata for a path.
    fn announce_metadata(&mut self, path: &str, metadata: &PathMetadata);

    /// Publish a reading for a path.
    fn publish_value(&mut self, path: &str, value: Value);
}

/// Receives human-readable start, stop and error notifications.
pub trait StatusSink {
    fn set_status(&mut self, message: &str);

    fn set_error(&mut self, message: &str);
}

/// Status sink that writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn set_status(&mut self, message: &str) {
        info!("{}", message);
    }

    fn set_error(&mut self, message: &str) {
        error!("{}", message);
    }
}

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Metadata { path: String, metadata: PathMetadata },
    Value { path: String, value: Value },
    Status(String),
    Error(String),
}

/// In-memory sink that keeps every call in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Metadata announcements, in order.
    pub fn metadata(&self) -> Vec<(&str, &PathMetadata)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Metadata { path, metadata } => Some((path.as_str(), metadata)),
                _ => None,
            })
            .collect()
    }

    /// Published values, in order.
    pub fn values(&self) -> Vec<(&str, &Value)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Value { path, value } => Some((path.as_str(), value)),
                _ => None,
            })
            .collect()
    }

    /// Error notifications, in order.
    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Error(message) => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl DeltaSink for RecordingSink {
    fn announce_metadata(&mut self, path: &str, metadata: &PathMetadata) {
        self.events.push(SinkEvent::Metadata {
            path: path.to_string(),
            metadata: metadata.clone(),
        });
    }

    fn publish_value(&mut self, path: &str, value: Value) {
        self.events.push(SinkEvent::Value {
            path: path.to_string(),
            value,
        });
    }
}

impl StatusSink for RecordingSink {
    fn set_status(&mut self, message: &str) {
        self.events.push(SinkEvent::Status(message.to_string()));
    }

    fn set_error(&mut self, message: &str) {
        self.events.push(SinkEvent::Error(message.to_string()));
    }
}
