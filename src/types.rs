// =============================================================================
// Wire types shared across the signal pipeline
// =============================================================================
//
// `MarketSnapshot` is what the trading client sends in; `TradingDecision` is
// what it always gets back. Both live for exactly one request.
// =============================================================================

use serde::{Deserialize, Serialize};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "XAUUSD".to_string()
}

fn default_timeframe() -> String {
    "M15".to_string()
}

fn default_digits() -> u32 {
    2
}

fn default_point() -> f64 {
    0.01
}

fn default_max_spread_points() -> i64 {
    50
}

fn default_risk_percent() -> f64 {
    1.0
}

fn default_min_rr() -> f64 {
    1.5
}

fn default_expiry_minutes() -> i64 {
    240
}

// =============================================================================
// Request side
// =============================================================================

/// A single OHLCV candle as sent by the trading client.
///
/// No invariants are enforced here. A candle with `high < low` is accepted and
/// simply produces a degenerate true range downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time, ISO-8601.
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Risk limits the client wants the decision to respect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default = "default_max_spread_points")]
    pub max_spread_points: i64,

    /// Forwarded for the client's own sizing; not used by the pipeline.
    #[serde(default = "default_risk_percent")]
    pub risk_percent: f64,

    /// Minimum reward:risk ratio the take-profit must satisfy.
    #[serde(default = "default_min_rr")]
    pub min_rr: f64,

    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: i64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_spread_points: default_max_spread_points(),
            risk_percent: default_risk_percent(),
            min_rr: default_min_rr(),
            expiry_minutes: default_expiry_minutes(),
        }
    }
}

/// Everything the client knows about the market at request time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default = "default_symbol")]
    pub symbol: String,

    #[serde(default = "default_timeframe")]
    pub timeframe: String,

    /// Client-side server clock. Logged only; the pipeline uses its own clock.
    #[serde(default)]
    pub server_time_utc: String,

    pub bid: f64,
    pub ask: f64,

    /// Current spread in points.
    pub spread_points: i64,

    /// Price precision (decimal places).
    #[serde(default = "default_digits")]
    pub digits: u32,

    /// Size of one point in price units.
    #[serde(default = "default_point")]
    pub point: f64,

    /// Chronological, newest last.
    pub candles: Vec<Candle>,

    /// Precomputed volatility. When present it overrides the local ATR.
    #[serde(default)]
    pub atr: Option<f64>,

    #[serde(default)]
    pub constraints: Constraints,
}

// =============================================================================
// Response side
// =============================================================================

/// Directional view attached to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl Bias {
    pub const ALL: [Bias; 3] = [Bias::Bullish, Bias::Bearish, Bias::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only pending breakout orders are ever proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    BuyStop,
    SellStop,
    None,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [OrderType::BuyStop, OrderType::SellStop, OrderType::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyStop => "buy_stop",
            Self::SellStop => "sell_stop",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The proposed pending order. All-zero with `type = none` on a veto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Order {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub entry: f64,
    pub sl: f64,
    pub tp: f64,
    pub expiry_minutes: i64,
    pub comment: String,
}

impl Order {
    /// The empty order carried by every veto.
    pub fn none() -> Self {
        Self {
            order_type: OrderType::None,
            entry: 0.0,
            sl: 0.0,
            tp: 0.0,
            expiry_minutes: 0,
            comment: String::new(),
        }
    }
}

/// Structured decision returned to the trading client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TradingDecision {
    pub symbol: String,
    pub timestamp_utc: String,
    pub bias: Bias,
    pub order: Order,
    /// Closed interval [0, 1].
    pub confidence: f64,
    pub veto: bool,
    /// Empty unless `veto` is set.
    pub veto_reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_defaults_fill_optional_fields() {
        let snap: MarketSnapshot = serde_json::from_value(serde_json::json!({
            "bid": 2010.5,
            "ask": 2010.8,
            "spread_points": 30,
            "candles": []
        }))
        .unwrap();

        assert_eq!(snap.symbol, "XAUUSD");
        assert_eq!(snap.timeframe, "M15");
        assert_eq!(snap.digits, 2);
        assert_eq!(snap.point, 0.01);
        assert_eq!(snap.atr, None);
        assert_eq!(snap.constraints, Constraints::default());
        assert_eq!(snap.constraints.max_spread_points, 50);
        assert_eq!(snap.constraints.expiry_minutes, 240);
    }

    #[test]
    fn candle_volume_defaults_to_zero() {
        let c: Candle = serde_json::from_str(
            r#"{"time":"2024-01-01T00:00:00Z","open":1.0,"high":2.0,"low":0.5,"close":1.5}"#,
        )
        .unwrap();
        assert_eq!(c.volume, 0.0);
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&OrderType::BuyStop).unwrap(), "\"buy_stop\"");
        assert_eq!(serde_json::to_string(&Bias::Neutral).unwrap(), "\"neutral\"");
        for t in OrderType::ALL {
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
        }
    }

    #[test]
    fn order_type_field_is_named_type() {
        let v = serde_json::to_value(Order::none()).unwrap();
        assert_eq!(v["type"], "none");
        assert!(v.get("order_type").is_none());
    }
}
