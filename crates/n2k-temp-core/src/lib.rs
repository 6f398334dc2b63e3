//! Extended range temperature mapping.
//!
//! Routes decoded NMEA 2000 "Temperature, Extended Range" messages (PGN
//! 130316) to data tree paths chosen from a configurable, ordered rule table.
//!
//! ## Architecture
//!
//! ```text
//! decoded message ──→ DispatchRegistry ──→ TemperatureExtractor (x2)
//!                                             │
//!                                             ├─ resolve()        MappingTable, first match wins
//!                                             ├─ announce_once()  SeenPathSet, metadata once per leaf
//!                                             └─ DeltaSink        metadata + values
//! ```
//!
//! - **MappingTable**: rules loaded from the `temperatureMapping` config key,
//!   or the built-in defaults for an empty configuration
//! - **resolve**: pure lookup and template substitution
//! - **SeenPathSet**: owned by the running [`TemperatureFeature`]
//! - **DeltaSink / StatusSink**: the host side

pub mod announcer;
pub mod builtin;
pub mod config;
pub mod delta;
pub mod dispatch;
pub mod error;
pub mod feature;
pub mod mapping;
pub mod message;
pub mod resolver;
pub mod sink;

pub use announcer::{announce_once, Channel, SeenPathSet};
pub use builtin::builtin_temperature_mappings;
pub use config::FeatureConfig;
pub use delta::{Delta, DeltaWriter};
pub use dispatch::{ChannelExtractor, DispatchRegistry, ExtractContext, TemperatureExtractor};
pub use error::{ConfigError, Result};
pub use feature::TemperatureFeature;
pub use mapping::{MappingRule, MappingTable, Selector};
pub use message::{DecodedMessage, N2kMessage};
pub use resolver::{render_path, resolve, resolve_message, ResolvedMapping};
pub use sink::{DeltaSink, LogStatus, PathMetadata, RecordingSink, SinkEvent, StatusSink};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
