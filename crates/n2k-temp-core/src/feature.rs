//! Feature lifecycle: start from the plugin configuration, handle messages,
//! stop.

use tracing::{debug, info, warn};

use crate::announcer::SeenPathSet;
use crate::config::FeatureConfig;
use crate::dispatch::{DispatchRegistry, ExtractContext};
use crate::error::Result;
use crate::mapping::MappingTable;
use crate::message::DecodedMessage;
use crate::sink::{DeltaSink, StatusSink};

/// State that only exists while the feature is running.
struct ActiveState {
    table: MappingTable,
    seen: SeenPathSet,
    registry: DispatchRegistry,
}

/// The temperature mapping feature as seen by the host.
///
/// Messages are handled one at a time; `handle` takes `&mut self` and the
/// seen-path set lives inside the feature, so no locking is involved.
#[derive(Default)]
pub struct TemperatureFeature {
    state: Option<ActiveState>,
}

impl TemperatureFeature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the mapping table and activate.
    ///
    /// On a configuration error a single error notification is reported and
    /// the feature stays inactive. The error is returned to the caller but is
    /// never meant to take the host down.
    pub fn start(&mut self, config: &FeatureConfig, status: &mut dyn StatusSink) -> Result<()> {
        if self.state.is_some() {
            warn!("Temperature mapping already started, restarting");
            self.state = None;
        }

        let table = match config.mapping_table() {
            Ok(table) => table,
            Err(e) => {
                status.set_error(&format!("Invalid temperature mapping configuration: {}", e));
                return Err(e);
            }
        };

        let rule_count = table.len();
        self.state = Some(ActiveState {
            table,
            seen: SeenPathSet::new(),
            registry: DispatchRegistry::with_defaults(),
        });

        info!("Temperature mapping started with {} rules", rule_count);
        status.set_status(&format!("Started with {} temperature mapping rules", rule_count));
        Ok(())
    }

    /// Deactivate. Seen paths are forgotten.
    pub fn stop(&mut self, status: &mut dyn StatusSink) {
        if self.state.take().is_some() {
            info!("Temperature mapping stopped");
            status.set_status("Stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Handle one decoded message. Returns the number of values published.
    pub fn handle(&mut self, pgn: u32, msg: &DecodedMessage, sink: &mut dyn DeltaSink) -> usize {
        let Some(state) = self.state.as_mut() else {
            debug!("Temperature mapping inactive, message for PGN {} dropped", pgn);
            return 0;
        };

        let mut ctx = ExtractContext {
            table: &state.table,
            seen: &mut state.seen,
            sink,
        };
        state.registry.dispatch(pgn, msg, &mut ctx)
    }

    /// The active mapping table.
    pub fn table(&self) -> Option<&MappingTable> {
        self.state.as_ref().map(|s| &s.table)
    }

    /// Leaf paths announced so far.
    pub fn seen_paths(&self) -> Option<&SeenPathSet> {
        self.state.as_ref().map(|s| &s.seen)
    }

    /// Check if the feature handles a message type.
    pub fn handles_pgn(&self, pgn: u32) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.registry.is_supported(pgn))
    }
}
