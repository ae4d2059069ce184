// =============================================================================
// Average True Range (ATR) — simple mean over a trailing window
// =============================================================================
//
// True Range (TR) for each bar after the first:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the arithmetic mean of the last min(period, n - 1) TR values.
// Fewer than two candles cannot form a TR and yield 0.0.
//
// Default period: 14
// =============================================================================

use crate::types::Candle;

/// Look-back used by the pipeline.
pub const DEFAULT_PERIOD: usize = 14;

/// True Range for every consecutive pair of candles (oldest first).
///
/// The result has `candles.len() - 1` entries, or none for fewer than two
/// candles.
pub fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|pair| {
            let prev_close = pair[0].close;
            let high = pair[1].high;
            let low = pair[1].low;

            let hl = high - low;
            let hc = (high - prev_close).abs();
            let lc = (low - prev_close).abs();

            hl.max(hc).max(lc)
        })
        .collect()
}

/// Mean True Range over the last `period` bars.
///
/// Returns `0.0` when fewer than two candles are supplied or `period` is zero.
/// When fewer than `period` TR values exist, all of them are averaged.
pub fn calculate_atr(candles: &[Candle], period: usize) -> f64 {
    let trs = true_ranges(candles);
    if trs.is_empty() || period == 0 {
        return 0.0;
    }

    let p = period.min(trs.len());
    let window = &trs[trs.len() - p..];
    window.iter().sum::<f64>() / p as f64
}

/// Convenience: ATR with the standard 14-period default.
pub fn calculate(candles: &[Candle]) -> f64 {
    calculate_atr(candles, DEFAULT_PERIOD)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Build a test candle with the given HLC values.
    fn candle(high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: "2024-01-01T00:00:00Z".to_string(),
            open: close,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn atr_empty_is_zero() {
        assert_eq!(calculate(&[]), 0.0);
    }

    #[test]
    fn atr_single_candle_is_zero() {
        assert_eq!(calculate(&[candle(2020.0, 2000.0, 2010.0)]), 0.0);
    }

    #[test]
    fn atr_period_zero_is_zero() {
        let candles = vec![candle(105.0, 95.0, 100.0); 5];
        assert_eq!(calculate_atr(&candles, 0), 0.0);
    }

    #[test]
    fn atr_two_candles_uses_single_true_range() {
        // max(2030-2015, |2030-2010|, |2015-2010|) = 20
        let candles = vec![candle(2020.0, 2000.0, 2010.0), candle(2030.0, 2015.0, 2025.0)];
        assert_eq!(true_ranges(&candles), vec![20.0]);
        assert_eq!(calculate(&candles), 20.0);
    }

    #[test]
    fn atr_twenty_candles_hand_computed() {
        // (high, low, close), with gaps so every TR branch wins somewhere.
        let bars = [
            (101.0, 99.0, 100.0),
            (104.0, 100.0, 103.0),
            (110.0, 106.0, 109.0),
            (108.0, 101.0, 102.0),
            (103.0, 95.0, 96.0),
            (99.0, 97.0, 98.0),
            (106.0, 104.0, 105.0), // gap up:   |H - pc| = 8 > H - L = 2
            (107.0, 100.0, 101.0),
            (101.0, 92.0, 93.0),
            (95.0, 91.0, 94.0),
            (103.0, 100.0, 102.0), // gap up:   |H - pc| = 9
            (104.0, 101.0, 103.0),
            (99.0, 96.0, 97.0),    // gap down: |L - pc| = 7
            (100.0, 97.0, 99.0),
            (108.0, 105.0, 107.0), // gap up:   |H - pc| = 9
            (109.0, 104.0, 105.0),
            (106.0, 102.0, 104.0),
            (100.0, 96.0, 97.0),   // gap down: |L - pc| = 8
            (99.0, 95.0, 98.0),
            (107.0, 104.0, 106.0), // gap up:   |H - pc| = 9
        ];
        let candles: Vec<Candle> = bars.iter().map(|&(h, l, c)| candle(h, l, c)).collect();

        let trs = true_ranges(&candles);
        assert_eq!(
            trs,
            vec![
                4.0, 7.0, 8.0, 8.0, 3.0, 8.0, 7.0, 9.0, 4.0, 9.0, 3.0, 7.0, 3.0, 9.0, 5.0, 4.0,
                8.0, 4.0, 9.0
            ]
        );

        // Last 14 TRs: 8 7 9 4 9 3 7 3 9 5 4 8 4 9 -> sum 89.
        assert_eq!(calculate(&candles), 89.0 / 14.0);
    }

    #[test]
    fn atr_short_history_averages_everything() {
        // 4 candles -> 3 TRs, fewer than 14: plain mean of all three.
        let candles = vec![
            candle(101.0, 99.0, 100.0),
            candle(102.0, 100.0, 101.0), // TR = max(2, 2, 0) = 2
            candle(105.0, 101.0, 104.0), // TR = max(4, 4, 0) = 4
            candle(104.0, 98.0, 99.0),   // TR = max(6, 0, 6) = 6
        ];
        assert_eq!(calculate(&candles), 4.0);
    }

    #[test]
    fn atr_true_range_uses_prev_close() {
        // Gap scenario: |H - prevClose| > H - L
        let candles = vec![candle(105.0, 95.0, 95.0), candle(115.0, 108.0, 112.0)];
        assert_eq!(calculate(&candles), 20.0);
    }

    #[test]
    fn atr_inverted_candle_degrades_without_panicking() {
        // high < low is accepted as-is.
        let candles = vec![candle(100.0, 100.0, 100.0), candle(90.0, 110.0, 100.0)];
        let atr = calculate(&candles);
        assert!(atr.is_finite());
        assert_eq!(atr, 10.0);
    }
}
