//! Decoded message types as delivered by the decoder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields of a decoded extended range temperature message.
///
/// The decoder hands over a field mapping keyed by display names. `Source`
/// may be a raw number or a symbolic name for well-known codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedMessage {
    #[serde(rename = "Source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(rename = "Instance", default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<u32>,
    /// Measured temperature in kelvin
    #[serde(rename = "Temperature", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Set point in kelvin
    #[serde(rename = "Set Temperature", default, skip_serializing_if = "Option::is_none")]
    pub set_temperature: Option<f64>,
}

impl DecodedMessage {
    /// Create a message with a source and instance and no readings.
    pub fn new(source: impl Into<Value>, instance: u32) -> Self {
        Self {
            source: Some(source.into()),
            instance: Some(instance),
            temperature: None,
            set_temperature: None,
        }
    }

    pub fn with_temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }

    pub fn with_set_temperature(mut self, kelvin: f64) -> Self {
        self.set_temperature = Some(kelvin);
        self
    }
}

/// A decoded message together with its message type, one per input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct N2kMessage {
    pub pgn: u32,
    /// Bus address of the sending device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<u8>,
    #[serde(default)]
    pub fields: DecodedMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pgn;
    use serde_json::json;

    #[test]
    fn test_deserialize_field_names() {
        let msg: DecodedMessage = serde_json::from_value(json!({
            "SID": 0,
            "Source": "Sea Temperature",
            "Instance": 2,
            "Temperature": 288.15,
            "Set Temperature": 290.0
        }))
        .unwrap();

        assert_eq!(msg.source, Some(json!("Sea Temperature")));
        assert_eq!(msg.instance, Some(2));
        assert_eq!(msg.temperature, Some(288.15));
        assert_eq!(msg.set_temperature, Some(290.0));
    }

    #[test]
    fn test_deserialize_missing_readings() {
        let msg: DecodedMessage =
            serde_json::from_value(json!({ "Source": 99, "Instance": 5 })).unwrap();
        assert_eq!(msg, DecodedMessage::new(99, 5));
    }

    #[test]
    fn test_envelope() {
        let msg: N2kMessage = serde_json::from_str(
            r#"{"pgn":130316,"src":35,"fields":{"Source":0,"Instance":1,"Temperature":280.0}}"#,
        )
        .unwrap();
        assert_eq!(msg.pgn, pgn::TEMPERATURE_EXTENDED_RANGE);
        assert_eq!(msg.src, Some(35));
        assert_eq!(msg.fields.temperature, Some(280.0));
    }
}
