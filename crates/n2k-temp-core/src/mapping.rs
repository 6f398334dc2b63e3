//! Mapping table: the ordered rule list that routes a temperature source to
//! a destination path template.
//!
//! ## Matching order
//!
//! ```text
//! temperatureMapping            incoming (Source, Instance)
//! ├─ 0  Sea Temperature   ───→  "0" / "Sea Temperature"  → environment.water.${instance}
//! ├─ 1  Outside Temperature
//! ├─ ...
//! └─ *                    ───→  anything else            → sensors.temperature.${source}.${instance}
//! ```
//!
//! Rules are evaluated in table order and the first match wins. The table is
//! never re-ordered or indexed by selector, so duplicate selectors (code 7 in
//! the default table) keep their relative priority.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::builtin::builtin_temperature_mappings;
use crate::config::{keys, placeholders, value_kind};
use crate::error::{ConfigError, Result};

/// Which sources a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Matches every source
    Wildcard,
    /// Matches one source code, compared in string form
    Code(String),
}

impl Selector {
    /// Build a selector from a config value (string or number).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s == placeholders::WILDCARD => Some(Self::Wildcard),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Code(s.clone())),
            Value::Number(_) => normalize_code(value).map(Self::Code),
            _ => None,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    /// String form used in templates and output.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard => placeholders::WILDCARD,
            Self::Code(code) => code,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a source code to the string form used for comparison.
///
/// Decoders send well-known codes as symbolic names and everything else as
/// raw numbers, so both sides of a comparison go through here. Integral
/// floats (`7.0`) collapse to their integer form; integral floats beyond the
/// `i64` range keep all their digits instead of saturating.
pub fn normalize_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.is_finite() && f.fract() == 0.0 {
                        if f >= i64::MIN as f64 && f < i64::MAX as f64 {
                            format!("{}", f as i64)
                        } else {
                            format!("{:.0}", f)
                        }
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// One entry of the mapping table.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRule {
    /// Source selector
    pub source: Selector,
    /// Path template with `${source}`, `${instance}` and `${name}` placeholders
    pub path: String,
    /// Optional display name, also usable as an alternate selector
    pub name: Option<String>,
}

impl MappingRule {
    /// Create a rule for an exact source code.
    pub fn new(source: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            source: Selector::Code(source.into()),
            path: path.into(),
            name: None,
        }
    }

    /// Create a rule that matches any source.
    pub fn wildcard(path: impl Into<String>) -> Self {
        Self {
            source: Selector::Wildcard,
            path: path.into(),
            name: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Check whether this rule applies to a normalized source code.
    ///
    /// The name comparison is kept separate from the selector comparison:
    /// it only exists because decoders may send the symbolic name.
    pub fn matches(&self, source: &str) -> bool {
        match &self.source {
            Selector::Wildcard => true,
            Selector::Code(code) if code == source => true,
            Selector::Code(_) => self.name.as_deref() == Some(source),
        }
    }

    /// Parse and shape-check one rule from its config value.
    fn from_value(index: usize, value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            ConfigError::invalid_rule(index, format!("expected object, got {}", value_kind(value)))
        })?;

        let source = obj
            .get("source")
            .and_then(Selector::from_value)
            .ok_or_else(|| ConfigError::invalid_rule(index, "missing or invalid source"))?;

        let path = match obj.get("path") {
            Some(Value::String(p)) if !p.trim().is_empty() => p.clone(),
            _ => return Err(ConfigError::invalid_rule(index, "missing or empty path")),
        };

        let name = match obj.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(n)) => Some(n.clone()),
            Some(other) => {
                return Err(ConfigError::invalid_rule(
                    index,
                    format!("name must be a string, got {}", value_kind(other)),
                ))
            }
        };

        Ok(Self { source, path, name })
    }
}

impl Serialize for MappingRule {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.name.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("MappingRule", len)?;
        state.serialize_field("source", self.source.as_str())?;
        state.serialize_field("path", &self.path)?;
        if let Some(name) = &self.name {
            state.serialize_field("name", name)?;
        }
        state.end()
    }
}

/// Ordered, immutable list of mapping rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MappingTable {
    rules: Vec<MappingRule>,
}

impl MappingTable {
    /// Create a table from rules. The list must not be empty.
    pub fn new(rules: Vec<MappingRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyMapping);
        }
        Ok(Self { rules })
    }

    /// The built-in table covering the standard temperature sources.
    pub fn defaults() -> Self {
        Self {
            rules: builtin_temperature_mappings(),
        }
    }

    /// Validate a raw plugin configuration object and build the table.
    ///
    /// An empty object selects the built-in defaults. Anything else must
    /// carry a non-empty `temperatureMapping` list.
    pub fn from_config(config: &Value) -> Result<Self> {
        let obj = match config {
            Value::Null => return Err(ConfigError::Missing),
            Value::Object(obj) => obj,
            other => return Err(ConfigError::NotAnObject(value_kind(other).to_string())),
        };

        if obj.is_empty() {
            debug!("Empty configuration, using built-in temperature mappings");
            return Ok(Self::defaults());
        }

        let list = obj
            .get(keys::TEMPERATURE_MAPPING)
            .and_then(Value::as_array)
            .ok_or(ConfigError::MappingNotAList)?;

        let rules = list
            .iter()
            .enumerate()
            .map(|(index, value)| MappingRule::from_value(index, value))
            .collect::<Result<Vec<_>>>()?;

        Self::new(rules)
    }

    /// First rule that applies to a normalized source code.
    pub fn find(&self, source: &str) -> Option<&MappingRule> {
        self.rules.iter().find(|rule| rule.matches(source))
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
