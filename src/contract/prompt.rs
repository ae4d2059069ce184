// =============================================================================
// Prompt Rendering — instruction block and data payload
// =============================================================================
//
// Both renderers are pure functions of (snapshot, features, clock) so the
// exact text sent for a request is reproducible in tests and logs.
// =============================================================================

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::features::session::local_time_str;
use crate::features::structure::recent_window;
use crate::features::Features;
use crate::types::MarketSnapshot;

/// Fixed-offset local clock shown next to UTC in the instruction block.
#[derive(Debug, Clone)]
pub struct LocalClock {
    pub offset_hours: i32,
    pub label: String,
}

impl Default for LocalClock {
    fn default() -> Self {
        Self {
            offset_hours: 8,
            label: "MYT".to_string(),
        }
    }
}

/// System-role instruction text.
pub fn render_instructions(
    snapshot: &MarketSnapshot,
    features: &Features,
    now: DateTime<Utc>,
    clock: &LocalClock,
) -> String {
    let session = &features.session;
    let local = local_time_str(now, clock.offset_hours, &clock.label);
    let c = &snapshot.constraints;

    format!(
        r#"You are a professional {symbol} trading analyst.
You specialize in breakout and momentum trading.

=== CURRENT MARKET CONTEXT ===
- Server time: {utc} (local: {local})
- Trading session: {session_label} - {liquidity}
- Current price: Bid={bid}, Ask={ask}, Spread={spread} pts
- Timeframe: {timeframe} ({count} candles provided)
- ATR(14): {atr:.5} (recent average volatility per candle)

=== ANALYSIS FRAMEWORK ===
Before making your decision, mentally perform these analysis steps:

1. TECHNICAL ANALYSIS:
   - Identify key support and resistance levels from the candle data
   - Determine the prevailing trend direction (bullish, bearish, or sideways)
   - Look for candlestick patterns (engulfing, pin bars, breakout candles)
   - Use ATR to gauge current volatility and set appropriate distances

2. PRICE CONTEXT:
   - Where is price relative to its recent range? Near highs, lows, or mid-range?
   - Is there a clear trending structure (higher highs/lows or lower highs/lows)?
   - Is the market in a consolidation/squeeze that could lead to a breakout?

3. SESSION CONTEXT:
   - Current session: {session_label}. {liquidity}.
   - During the Asian session, prefer wider stops and be cautious with breakouts.
   - During London/New York, breakouts are more reliable - look for momentum.
   - During the London-New York overlap, expect the strongest moves.

4. STRATEGY DECISION:
   - BREAKOUT: Place a pending order beyond a key level to catch momentum.
   - VETO: If the market is choppy, unclear, or conditions are poor - do not trade.

=== ORDER RULES - follow these exactly ===
1. Only propose pending orders (buy_stop or sell_stop), never market orders.
2. buy_stop: entry at or above Ask + 1xATR ({buy_floor:.digits$} or higher).
   sell_stop: entry at or below Bid - 1xATR ({sell_ceiling:.digits$} or lower).
3. SL must be on the opposite side of entry:
   - buy_stop: SL < entry
   - sell_stop: SL > entry
4. TP must respect min R:R of {min_rr} (risk per trade is {risk_percent}% of equity; sizing is done by the client):
   - |TP - entry| >= {min_rr} x |entry - SL|
5. expiry_minutes = {expiry}.
6. Provide a short comment (max 30 chars) describing the setup.
7. If spread ({spread} pts) > max allowed ({max_spread} pts),
   OR if no clear setup exists, set order.type="none", veto=true,
   and a non-empty veto_reason explaining why.
8. All prices must be rounded to {digits} decimal places.
9. symbol = "{symbol}". timestamp_utc = current UTC time in ISO-8601.

=== CONFIDENCE GUIDE ===
- 0.80-1.00: Strong conviction - clear trend, key level breakout, good session, multiple confirming factors.
- 0.60-0.79: Moderate conviction - decent setup but some uncertainty.
- 0.40-0.59: Weak setup - strongly consider vetoing.
- Below 0.40: Veto. Do not trade.

Respond ONLY with valid JSON matching the required schema. No extra text."#,
        symbol = snapshot.symbol,
        utc = session.utc_str,
        local = local,
        session_label = session.session.label(),
        liquidity = session.liquidity,
        bid = snapshot.bid,
        ask = snapshot.ask,
        spread = snapshot.spread_points,
        timeframe = snapshot.timeframe,
        count = snapshot.candles.len(),
        atr = features.volatility,
        buy_floor = snapshot.ask + features.volatility,
        sell_ceiling = snapshot.bid - features.volatility,
        digits = snapshot.digits as usize,
        min_rr = c.min_rr,
        risk_percent = c.risk_percent,
        expiry = c.expiry_minutes,
        max_spread = c.max_spread_points,
    )
}

/// User-role data payload: structure summary, trailing candles, live quote.
pub fn render_payload(snapshot: &MarketSnapshot, features: &Features) -> String {
    let s = &features.structure;
    let digits = snapshot.digits as usize;

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "=== MARKET STRUCTURE SUMMARY ===");
    let _ = writeln!(out, "Recent 50-candle high: {}", s.recent_high);
    let _ = writeln!(out, "Recent 50-candle low:  {}", s.recent_low);
    let _ = writeln!(
        out,
        "Current price position: {:.0}% of range (0%=at low, 100%=at high)",
        s.position_pct
    );
    let _ = writeln!(
        out,
        "Short-term trend: {} (moved {:+.*} over last 50 candles)",
        s.trend, digits, s.trend_change
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "=== CANDLE DATA (newest last) ===");
    for c in recent_window(&snapshot.candles) {
        let _ = writeln!(
            out,
            "  {} O={} H={} L={} C={} V={}",
            c.time, c.open, c.high, c.low, c.close, c.volume
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Bid={} Ask={} Spread={}pts",
        snapshot.bid, snapshot.ask, snapshot.spread_points
    );
    let _ = writeln!(out, "Digits={} Point={}", snapshot.digits, snapshot.point);
    let _ = writeln!(out);
    let _ = write!(
        out,
        "Analyze the market using the framework above and produce the trading signal."
    );
    out
}
