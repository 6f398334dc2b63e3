//! Extractor trait and registry routing decoded messages to channel
//! extractors by message type.

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use crate::announcer::{announce_once, Channel, SeenPathSet};
use crate::config::pgn;
use crate::mapping::MappingTable;
use crate::message::DecodedMessage;
use crate::resolver::resolve_message;
use crate::sink::DeltaSink;

/// Everything an extractor may consult or touch while handling one message.
pub struct ExtractContext<'a> {
    pub table: &'a MappingTable,
    pub seen: &'a mut SeenPathSet,
    pub sink: &'a mut dyn DeltaSink,
}

/// One path/value extraction pair registered for a message type.
pub trait ChannelExtractor: Send + Sync {
    /// Destination path for this message, or `None` to skip it.
    fn path(&self, msg: &DecodedMessage, ctx: &mut ExtractContext<'_>) -> Option<String>;

    /// Value to publish at the destination path.
    fn value(&self, msg: &DecodedMessage) -> Option<f64>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Extracts one reading of an extended range temperature message.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureExtractor {
    channel: Channel,
}

impl TemperatureExtractor {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

impl ChannelExtractor for TemperatureExtractor {
    fn path(&self, msg: &DecodedMessage, ctx: &mut ExtractContext<'_>) -> Option<String> {
        let resolved = resolve_message(ctx.table, msg)?;
        announce_once(&resolved, ctx.seen, ctx.sink);
        Some(resolved.leaf_path(self.channel.leaf()))
    }

    fn value(&self, msg: &DecodedMessage) -> Option<f64> {
        self.channel.value(msg)
    }

    fn name(&self) -> &str {
        self.channel.leaf()
    }
}

/// Registry mapping message type identifiers to their extractors.
pub struct DispatchRegistry {
    extractors: HashMap<u32, Vec<Box<dyn ChannelExtractor>>>,
}

impl DispatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Create a registry with both temperature channels registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for channel in Channel::ALL {
            registry.register(
                pgn::TEMPERATURE_EXTENDED_RANGE,
                TemperatureExtractor::new(channel),
            );
        }
        registry
    }

    /// Register an extractor for a message type. Extractors run in
    /// registration order.
    pub fn register<E>(&mut self, pgn: u32, extractor: E)
    where
        E: ChannelExtractor + 'static,
    {
        self.extractors
            .entry(pgn)
            .or_default()
            .push(Box::new(extractor));
    }

    /// Check if a message type has extractors.
    pub fn is_supported(&self, pgn: u32) -> bool {
        self.extractors.contains_key(&pgn)
    }

    /// Get all message types with extractors.
    pub fn supported_pgns(&self) -> Vec<u32> {
        let mut pgns: Vec<u32> = self.extractors.keys().copied().collect();
        pgns.sort_unstable();
        pgns
    }

    /// Run every extractor registered for `pgn` over one message.
    ///
    /// Returns the number of values published.
    pub fn dispatch(&self, pgn: u32, msg: &DecodedMessage, ctx: &mut ExtractContext<'_>) -> usize {
        let Some(extractors) = self.extractors.get(&pgn) else {
            trace!("No extractor for PGN {}", pgn);
            return 0;
        };

        let mut published = 0;
        for extractor in extractors {
            let Some(path) = extractor.path(msg, ctx) else {
                continue;
            };

            match extractor.value(msg) {
                Some(value) => {
                    ctx.sink.publish_value(&path, Value::from(value));
                    published += 1;
                }
                None => trace!("No {} value for {}", extractor.name(), path),
            }
        }

        published
    }
}

impl Default for DispatchRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use serde_json::json;

    fn dispatch_one(
        registry: &DispatchRegistry,
        seen: &mut SeenPathSet,
        sink: &mut RecordingSink,
        pgn: u32,
        msg: &DecodedMessage,
    ) -> usize {
        let table = MappingTable::defaults();
        let mut ctx = ExtractContext {
            table: &table,
            seen,
            sink,
        };
        registry.dispatch(pgn, msg, &mut ctx)
    }

    #[test]
    fn test_defaults_register_temperature_pgn() {
        let registry = DispatchRegistry::with_defaults();
        assert!(registry.is_supported(130316));
        assert!(!registry.is_supported(130312));
        assert_eq!(registry.supported_pgns(), vec![130316]);
    }

    #[test]
    fn test_dispatch_publishes_both_channels() {
        let registry = DispatchRegistry::with_defaults();
        let mut seen = SeenPathSet::new();
        let mut sink = RecordingSink::new();
        let msg = DecodedMessage::new(0, 2)
            .with_temperature(288.15)
            .with_set_temperature(290.0);

        let published = dispatch_one(&registry, &mut seen, &mut sink, 130316, &msg);

        assert_eq!(published, 2);
        assert_eq!(
            sink.values(),
            vec![
                ("environment.water.2.temperature", &json!(288.15)),
                ("environment.water.2.setTemperature", &json!(290.0)),
            ]
        );
        assert_eq!(sink.metadata().len(), 2);
    }

    #[test]
    fn test_missing_set_point_publishes_temperature_only() {
        let registry = DispatchRegistry::with_defaults();
        let mut seen = SeenPathSet::new();
        let mut sink = RecordingSink::new();
        let msg = DecodedMessage::new(1, 0).with_temperature(280.0);

        let published = dispatch_one(&registry, &mut seen, &mut sink, 130316, &msg);

        assert_eq!(published, 1);
        assert_eq!(sink.values()[0].0, "environment.outside.0.temperature");
        assert_eq!(sink.metadata().len(), 2);
    }

    #[test]
    fn test_unregistered_pgn_is_ignored() {
        let registry = DispatchRegistry::with_defaults();
        let mut seen = SeenPathSet::new();
        let mut sink = RecordingSink::new();
        let msg = DecodedMessage::new(0, 0).with_temperature(280.0);

        assert_eq!(dispatch_one(&registry, &mut seen, &mut sink, 130312, &msg), 0);
        assert!(sink.events().is_empty());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_no_match_publishes_nothing() {
        let table = MappingTable::new(vec![crate::mapping::MappingRule::new("0", "water")]).unwrap();
        let registry = DispatchRegistry::with_defaults();
        let mut seen = SeenPathSet::new();
        let mut sink = RecordingSink::new();
        let mut ctx = ExtractContext {
            table: &table,
            seen: &mut seen,
            sink: &mut sink,
        };

        let msg = DecodedMessage::new(5, 0).with_temperature(280.0);
        assert_eq!(registry.dispatch(130316, &msg, &mut ctx), 0);
        assert!(sink.events().is_empty());
    }
}
