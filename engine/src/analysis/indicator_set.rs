use crate::analysis::SkipReason;
use crate::indicators::{IndicatorCalculator, Rsi, Sma};
use shared::models::DailyBar;

/// Fewest bars a series needs before any indicator is trusted.
pub const MIN_HISTORY_BARS: usize = 120;

const SHORT_MA: usize = 20;
const LONG_MA: usize = 60;
const RSI_PERIOD: usize = 14;
/// The short average is compared with itself this many sessions earlier.
const SLOPE_LOOKBACK: usize = 5;

/// Snapshot of every indicator the classifier needs, taken at the most recent
/// bar of a series. Built once per candidate and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSet {
    pub current_price: f64,
    pub ma20: f64,
    pub ma60: f64,
    pub ma20_5days_ago: f64,
    pub rsi14: f64,
    /// Percent change of the 20-day average over the last 5 sessions.
    pub slope_pct: f64,
    /// Position of the current price inside the window's low/high range.
    pub progress: f64,
}

impl IndicatorSet {
    /// Computes the snapshot with the default 120-bar history requirement.
    pub fn compute(bars: &[DailyBar]) -> Result<Self, SkipReason> {
        Self::compute_with_min_bars(bars, MIN_HISTORY_BARS)
    }

    /// `bars` must be ascending by date. Fails with `InsufficientHistory` when
    /// fewer than `min_bars` bars are present or an indicator window cannot be
    /// filled.
    pub fn compute_with_min_bars(bars: &[DailyBar], min_bars: usize) -> Result<Self, SkipReason> {
        let insufficient = || SkipReason::InsufficientHistory {
            bars: bars.len(),
            required: min_bars.max(LONG_MA),
        };
        if bars.len() < min_bars || bars.len() < LONG_MA {
            return Err(insufficient());
        }

        let last = bars.len() - 1;
        let current_price = bars[last].close;

        let short = Sma::new(SHORT_MA);
        let ma20 = short.value_at(bars, last).ok_or_else(insufficient)?;
        let ma20_5days_ago = short.value_at(bars, last - SLOPE_LOOKBACK).ok_or_else(insufficient)?;
        let ma60 = Sma::new(LONG_MA).latest(bars).ok_or_else(insufficient)?;
        let rsi14 = Rsi::new(RSI_PERIOD).latest(bars).ok_or_else(insufficient)?;

        Ok(IndicatorSet {
            current_price,
            ma20,
            ma60,
            ma20_5days_ago,
            rsi14,
            slope_pct: slope_pct(ma20, ma20_5days_ago),
            progress: range_position(bars, current_price),
        })
    }
}

/// Percent change from `previous` to `current`; 0.0 when `previous` is zero.
pub fn slope_pct(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Where `price` sits between the lowest low and the highest high of `bars`,
/// clamped to [0, 1]. A flat range (high == low) maps to 0.0.
pub fn range_position(bars: &[DailyBar], price: f64) -> f64 {
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);

    let span = high - low;
    if !span.is_finite() || span <= 0.0 {
        return 0.0;
    }
    ((price - low) / span).clamp(0.0, 1.0)
}
