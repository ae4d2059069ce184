// =============================================================================
// Market Structure Summary
// =============================================================================
//
// A coarse read of the trailing window: range high/low, where the bid sits
// inside that range, and the net move from the first to the last close.
//
// Decision rule:
//   trend = bullish when last close > first close
//           bearish when last close < first close
//           flat otherwise, unknown without candles
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::types::{Candle, MarketSnapshot};

/// Number of most-recent candles the summary and payload look at.
pub const STRUCTURE_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Flat,
    Unknown,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Flat => "flat",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the structure read for a single request.
#[derive(Debug, Clone, Serialize)]
pub struct MarketStructure {
    pub recent_high: f64,
    pub recent_low: f64,
    /// Bid position within [low, high], 0 = at low, 100 = at high.
    /// 50 when the range is empty.
    pub position_pct: f64,
    pub trend: Trend,
    /// Last close minus first close.
    pub trend_change: f64,
    /// Candles actually inside the window.
    pub candle_count: usize,
}

impl MarketStructure {
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        Self::analyze(recent_window(&snapshot.candles), snapshot.bid)
    }

    /// Summarise `candles` (already windowed) relative to `price`.
    pub fn analyze(candles: &[Candle], price: f64) -> Self {
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return Self {
                recent_high: 0.0,
                recent_low: 0.0,
                position_pct: 0.0,
                trend: Trend::Unknown,
                trend_change: 0.0,
                candle_count: 0,
            };
        };

        let recent_high = candles
            .iter()
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let recent_low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

        let price_range = recent_high - recent_low;
        let position_pct = if price_range > 0.0 {
            (price - recent_low) / price_range * 100.0
        } else {
            50.0
        };

        let trend_change = last.close - first.close;
        let trend = if trend_change > 0.0 {
            Trend::Bullish
        } else if trend_change < 0.0 {
            Trend::Bearish
        } else {
            Trend::Flat
        };

        debug!(
            recent_high,
            recent_low,
            position_pct = format!("{:.1}", position_pct),
            trend = %trend,
            "market structure computed"
        );

        Self {
            recent_high,
            recent_low,
            position_pct,
            trend,
            trend_change,
            candle_count: candles.len(),
        }
    }
}

/// The trailing `STRUCTURE_WINDOW` candles (or all of them when fewer).
pub fn recent_window(candles: &[Candle]) -> &[Candle] {
    let start = candles.len().saturating_sub(STRUCTURE_WINDOW);
    &candles[start..]
}
