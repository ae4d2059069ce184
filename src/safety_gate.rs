// =============================================================================
// Safety Gate — pre-call veto and the canonical "no trade" decision
// =============================================================================
//
// Every failure path in the pipeline ends in `veto_response`. The caller never
// sees an error for a business outcome, only a decision with a reason.
//
// Gates (checked before the reasoning engine is called):
//   1. SpreadOk — spread_points <= constraints.max_spread_points
//
// The same spread rule is also stated to the engine; both layers enforce it.
// =============================================================================

use tracing::debug;

use crate::types::{Bias, MarketSnapshot, Order, TradingDecision};

/// Reason used for every engine or validation failure.
pub const MODEL_UNAVAILABLE: &str = "model_unavailable";

/// A pre-call veto with its human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veto {
    pub reason: String,
}

/// Run the pre-call gates. Returns `None` if all pass.
pub fn pre_check(snapshot: &MarketSnapshot) -> Option<Veto> {
    let max = snapshot.constraints.max_spread_points;
    if snapshot.spread_points > max {
        return Some(Veto {
            reason: format!("spread {} > max {}", snapshot.spread_points, max),
        });
    }

    debug!(symbol = %snapshot.symbol, "all pre-call gates passed");
    None
}

/// Build the canonical veto decision.
///
/// `order` is always `none` with every numeric field zeroed and confidence is
/// forced to 0.0.
pub fn veto_response(symbol: impl Into<String>, reason: impl Into<String>) -> TradingDecision {
    TradingDecision {
        symbol: symbol.into(),
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        bias: Bias::Neutral,
        order: Order::none(),
        confidence: 0.0,
        veto: true,
        veto_reason: reason.into(),
    }
}
