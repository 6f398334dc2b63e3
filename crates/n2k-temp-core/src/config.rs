//! Shared constants and configuration loading.
//!
//! Constants are grouped by concern so the library and the CLI agree on
//! key names, units and environment variables.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::mapping::MappingTable;

/// Message type identifiers
pub mod pgn {
    /// Temperature, Extended Range
    pub const TEMPERATURE_EXTENDED_RANGE: u32 = 130316;
}

/// Field and key names
pub mod keys {
    /// Config key holding the ordered rule list
    pub const TEMPERATURE_MAPPING: &str = "temperatureMapping";

    /// Message field names, also used in metadata descriptions
    pub const FIELD_TEMPERATURE: &str = "Temperature";
    pub const FIELD_SET_TEMPERATURE: &str = "Set Temperature";

    /// Leaf suffix for the measured value
    pub const LEAF_TEMPERATURE: &str = "temperature";
    /// Leaf suffix for the set point
    pub const LEAF_SET_TEMPERATURE: &str = "setTemperature";
}

/// Units
pub mod units {
    /// Kelvin, the native unit of the wire message
    pub const KELVIN: &str = "K";
}

/// Path template placeholders
pub mod placeholders {
    pub const SOURCE: &str = "${source}";
    pub const INSTANCE: &str = "${instance}";
    pub const NAME: &str = "${name}";

    /// Selector that matches any source
    pub const WILDCARD: &str = "*";
}

/// Environment variable names
pub mod env_vars {
    /// Emit logs as JSON when set to `true`
    pub const LOG_JSON: &str = "N2K_TEMP_LOG_JSON";
    /// Fallback config file path for the CLI
    pub const CONFIG_PATH: &str = "N2K_TEMP_CONFIG";
}

/// Plugin configuration as handed over by the host.
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    raw: Value,
}

impl FeatureConfig {
    /// Wrap a raw configuration object.
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// An empty configuration object, which selects the default table.
    pub fn empty() -> Self {
        Self::from_value(Value::Object(Default::default()))
    }

    /// Read a configuration object from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let raw: Value = serde_json::from_str(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(Self::from_value(raw))
    }

    /// Read the configuration file when a path is given, otherwise fall back
    /// to an empty configuration object.
    pub fn load_or_empty(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                info!("No configuration file given, using default mapping table");
                Ok(Self::empty())
            }
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Validate the configuration and build the mapping table.
    pub fn mapping_table(&self) -> Result<MappingTable> {
        MappingTable::from_config(&self.raw)
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for FeatureConfig {
    fn from(raw: Value) -> Self {
        Self::from_value(raw)
    }
}

/// Describe a JSON value's kind for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
