use crate::analysis::IndicatorSet;
use shared::models::{InstrumentRef, ScanResult, SignalStatus};

const OVERHEATED_RSI: f64 = 70.0;
const STRONG_BUY_SLOPE: f64 = 3.0;
const BUY_TIMING_SLOPE: f64 = 1.0;

/// Aligned uptrend: price above the 20-day average, which is above the 60-day one.
pub fn qualifies(set: &IndicatorSet) -> bool {
    set.current_price > set.ma20 && set.ma20 > set.ma60
}

/// First matching rule wins; RSI overrides any slope.
pub fn status_for(rsi14: f64, slope_pct: f64) -> SignalStatus {
    if rsi14 >= OVERHEATED_RSI {
        SignalStatus::Overheated
    } else if slope_pct >= STRONG_BUY_SLOPE {
        SignalStatus::StrongBuy
    } else if slope_pct >= BUY_TIMING_SLOPE {
        SignalStatus::BuyTiming
    } else {
        SignalStatus::HoldWatch
    }
}

/// Applies the trend filter and labels the instrument. Non-qualifying
/// instruments produce nothing. Thresholds use the raw values; the emitted
/// trend strength is rounded to 2 decimals and RSI to 1.
pub fn classify(set: &IndicatorSet, instrument: &InstrumentRef) -> Option<ScanResult> {
    if !qualifies(set) {
        return None;
    }

    Some(ScanResult {
        name: instrument.name.clone(),
        current_price: set.current_price,
        status: status_for(set.rsi14, set.slope_pct),
        trend_strength: round_to(set.slope_pct, 2),
        progress: set.progress,
        rsi: round_to(set.rsi14, 1),
        code: instrument.code.clone(),
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
