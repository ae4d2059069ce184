// =============================================================================
// Feature Deriver
// =============================================================================
//
// Turns a raw snapshot into the handful of numbers and labels the contract
// needs: volatility, trading session, and a short market-structure summary.
// Nothing here gates a trade.
// =============================================================================

pub mod session;
pub mod structure;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::atr;
use crate::types::MarketSnapshot;

use session::SessionInfo;
use structure::MarketStructure;

/// Everything derived from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Features {
    /// ATR(14), or the client-supplied override.
    pub volatility: f64,
    pub session: SessionInfo,
    pub structure: MarketStructure,
}

/// Derive features for `snapshot` at wall-clock time `now`.
pub fn derive(snapshot: &MarketSnapshot, now: DateTime<Utc>) -> Features {
    Features {
        volatility: volatility(snapshot),
        session: SessionInfo::at(now),
        structure: MarketStructure::from_snapshot(snapshot),
    }
}

/// Caller-supplied `atr` wins; otherwise compute ATR(14) from the candles.
pub fn volatility(snapshot: &MarketSnapshot) -> f64 {
    match snapshot.atr {
        Some(v) => v,
        None => atr::calculate(&snapshot.candles),
    }
}
