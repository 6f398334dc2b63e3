//! Dedup-gated metadata announcements.
//!
//! Metadata for a leaf path is announced once per feature lifetime. Values
//! are never gated.

use std::collections::HashSet;

use tracing::debug;

use crate::config::{keys, units};
use crate::message::DecodedMessage;
use crate::resolver::ResolvedMapping;
use crate::sink::{DeltaSink, PathMetadata};

/// Leaf paths whose metadata has already been announced.
///
/// Grows monotonically and is never persisted, so a restart announces
/// everything again.
#[derive(Debug, Default, Clone)]
pub struct SeenPathSet {
    paths: HashSet<String>,
}

impl SeenPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Record a path. Returns `true` if it was not seen before.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// The two readings carried by an extended range temperature message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Measured temperature
    Temperature,
    /// Target temperature
    SetTemperature,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Temperature, Channel::SetTemperature];

    /// Leaf suffix below the resolved base path.
    pub fn leaf(&self) -> &'static str {
        match self {
            Self::Temperature => keys::LEAF_TEMPERATURE,
            Self::SetTemperature => keys::LEAF_SET_TEMPERATURE,
        }
    }

    /// Name of the message field holding this reading.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Temperature => keys::FIELD_TEMPERATURE,
            Self::SetTemperature => keys::FIELD_SET_TEMPERATURE,
        }
    }

    /// Read this channel's value from a message.
    pub fn value(&self, msg: &DecodedMessage) -> Option<f64> {
        match self {
            Self::Temperature => msg.temperature,
            Self::SetTemperature => msg.set_temperature,
        }
    }

    /// Metadata for this channel's leaf of a resolved mapping.
    pub fn metadata(&self, resolved: &ResolvedMapping) -> PathMetadata {
        PathMetadata {
            description: format!("{}, Extended Range ({})", self.field(), resolved.label()),
            instance: resolved.instance,
            source: resolved.source.clone(),
            units: units::KELVIN.to_string(),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.leaf())
    }
}

/// Announce metadata for every leaf of `resolved` that has not been seen.
///
/// Returns the number of announcements made.
pub fn announce_once(
    resolved: &ResolvedMapping,
    seen: &mut SeenPathSet,
    sink: &mut dyn DeltaSink,
) -> usize {
    let mut announced = 0;

    for channel in Channel::ALL {
        let path = resolved.leaf_path(channel.leaf());
        if seen.contains(&path) {
            continue;
        }

        debug!("Announcing metadata for {}", path);
        sink.announce_metadata(&path, &channel.metadata(resolved));
        seen.insert(path);
        announced += 1;
    }

    announced
}
