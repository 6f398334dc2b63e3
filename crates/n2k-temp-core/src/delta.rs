//! JSON delta encoding for the host data tree.
//!
//! Each metadata announcement and each value becomes one delta written as a
//! single JSON line:
//!
//! ```text
//! {"context":"vessels.self","updates":[{"timestamp":"...","meta":[{"path":"environment.water.2.temperature","value":{...}}]}]}
//! {"context":"vessels.self","updates":[{"timestamp":"...","values":[{"path":"environment.water.2.temperature","value":288.15}]}]}
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::sink::{DeltaSink, PathMetadata};

/// Context used when none is configured.
pub const SELF_CONTEXT: &str = "vessels.self";

/// A path with its value or metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathValue {
    pub path: String,
    pub value: Value,
}

/// One update inside a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<PathValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<PathValue>,
}

/// A delta message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub context: String,
    pub updates: Vec<Update>,
}

impl Delta {
    /// Delta carrying a single value.
    pub fn value(context: &str, path: &str, value: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            context: context.to_string(),
            updates: vec![Update {
                timestamp,
                values: vec![PathValue {
                    path: path.to_string(),
                    value,
                }],
                meta: Vec::new(),
            }],
        }
    }

    /// Delta carrying metadata for a single path.
    pub fn meta(
        context: &str,
        path: &str,
        metadata: &PathMetadata,
        timestamp: DateTime<Utc>,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            context: context.to_string(),
            updates: vec![Update {
                timestamp,
                values: Vec::new(),
                meta: vec![PathValue {
                    path: path.to_string(),
                    value: serde_json::to_value(metadata)?,
                }],
            }],
        })
    }
}

/// Delta sink writing one JSON delta per line.
///
/// Every line is flushed as soon as it is written, so a metadata delta is
/// committed before the value delta that follows it.
pub struct DeltaWriter<W: Write> {
    out: W,
    context: String,
    written: usize,
}

impl<W: Write> DeltaWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            context: SELF_CONTEXT.to_string(),
            written: 0,
        }
    }

    /// Use a different context than `vessels.self`.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Number of deltas written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_delta(&mut self, delta: &Delta) {
        let result = serde_json::to_writer(&mut self.out, delta)
            .map_err(std::io::Error::from)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());

        match result {
            Ok(()) => self.written += 1,
            Err(e) => warn!("Failed to write delta: {}", e),
        }
    }
}

impl<W: Write> DeltaSink for DeltaWriter<W> {
    fn announce_metadata(&mut self, path: &str, metadata: &PathMetadata) {
        match Delta::meta(&self.context, path, metadata, Utc::now()) {
            Ok(delta) => self.write_delta(&delta),
            Err(e) => warn!("Failed to encode metadata for {}: {}", path, e),
        }
    }

    fn publish_value(&mut self, path: &str, value: Value) {
        let delta = Delta::value(&self.context, path, value, Utc::now());
        self.write_delta(&delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(writer: DeltaWriter<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(writer.into_inner())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_value_delta_shape() {
        let mut writer = DeltaWriter::new(Vec::new());
        writer.publish_value("environment.water.2.temperature", json!(288.15));
        assert_eq!(writer.written(), 1);

        let out = lines(writer);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["context"], "vessels.self");
        assert_eq!(
            out[0]["updates"][0]["values"][0],
            json!({ "path": "environment.water.2.temperature", "value": 288.15 })
        );
        assert!(out[0]["updates"][0].get("meta").is_none());
        assert!(out[0]["updates"][0]["timestamp"].is_string());
    }

    #[test]
    fn test_meta_delta_shape() {
        let mut writer = DeltaWriter::new(Vec::new()).with_context("vessels.urn:mrn:test");
        let metadata = PathMetadata {
            description: "Temperature, Extended Range (Sea Temperature)".to_string(),
            instance: 2,
            source: "0".to_string(),
            units: "K".to_string(),
        };
        writer.announce_metadata("environment.water.2.temperature", &metadata);

        let out = lines(writer);
        assert_eq!(out[0]["context"], "vessels.urn:mrn:test");
        assert_eq!(
            out[0]["updates"][0]["meta"][0]["value"],
            json!({
                "description": "Temperature, Extended Range (Sea Temperature)",
                "instance": 2,
                "source": "0",
                "units": "K"
            })
        );
        assert!(out[0]["updates"][0].get("values").is_none());
    }
}
