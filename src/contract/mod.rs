// =============================================================================
// Contract Builder
// =============================================================================
//
// Renders everything the reasoning engine receives for one request: the
// instruction text, the data payload, and the strict output schema.
// =============================================================================

pub mod prompt;
pub mod schema;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::features::Features;
use crate::types::MarketSnapshot;

pub use prompt::LocalClock;

/// The full, deterministic input to one inference call.
#[derive(Debug, Clone)]
pub struct Contract {
    /// System-role instruction text.
    pub instructions: String,
    /// User-role data payload.
    pub payload: String,
    /// Strict output schema (the bare schema, without the name envelope).
    pub schema: Value,
}

/// Builds contracts. Holds only presentation settings.
#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    clock: LocalClock,
}

impl ContractBuilder {
    pub fn new(clock: LocalClock) -> Self {
        Self { clock }
    }

    pub fn build(
        &self,
        snapshot: &MarketSnapshot,
        features: &Features,
        now: DateTime<Utc>,
    ) -> Contract {
        Contract {
            instructions: prompt::render_instructions(snapshot, features, now, &self.clock),
            payload: prompt::render_payload(snapshot, features),
            schema: schema::signal_schema(),
        }
    }
}
