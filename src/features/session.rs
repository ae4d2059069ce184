// =============================================================================
// Trading Session Context
// =============================================================================
//
// Approximate UTC ranges (non-overlapping as classified here):
//   London-New York overlap: 13:00 - 16:00
//   London:                  07:00 - 13:00
//   New York:                16:00 - 22:00
//   Asian/Sydney:            22:00 - 07:00
// =============================================================================

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::Serialize;

/// One of the four sessions a UTC hour falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradingSession {
    AsianSydney,
    London,
    NewYork,
    LondonNewYorkOverlap,
}

impl TradingSession {
    /// Classify a UTC hour (0..=23).
    pub fn from_utc_hour(hour: u32) -> Self {
        match hour {
            13..=15 => Self::LondonNewYorkOverlap,
            7..=12 => Self::London,
            16..=21 => Self::NewYork,
            _ => Self::AsianSydney,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AsianSydney => "Asian/Sydney session",
            Self::London => "London session",
            Self::NewYork => "New York session",
            Self::LondonNewYorkOverlap => "London-New York overlap",
        }
    }

    /// Qualitative liquidity descriptor for the prompt.
    pub fn liquidity(&self) -> &'static str {
        match self {
            Self::LondonNewYorkOverlap => "peak liquidity - highest volume and volatility",
            Self::London => "high liquidity - strong trading activity",
            Self::NewYork => "good liquidity - active trading",
            Self::AsianSydney => {
                "lower liquidity - typically range-bound, breakouts less reliable"
            }
        }
    }
}

impl std::fmt::Display for TradingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Session classification plus the timestamps rendered into the prompt.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session: TradingSession,
    pub liquidity: &'static str,
    pub utc_str: String,
}

impl SessionInfo {
    pub fn at(now: DateTime<Utc>) -> Self {
        let session = TradingSession::from_utc_hour(now.hour());
        Self {
            session,
            liquidity: session.liquidity(),
            utc_str: now.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

/// Render `now` in a fixed-offset local zone, e.g. `2024-05-01 22:30 MYT`.
///
/// Offsets outside +/-23h fall back to UTC.
pub fn local_time_str(now: DateTime<Utc>, offset_hours: i32, label: &str) -> String {
    let offset = offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix());
    let local = now.with_timezone(&offset);
    format!("{} {}", local.format("%Y-%m-%d %H:%M"), label)
}
