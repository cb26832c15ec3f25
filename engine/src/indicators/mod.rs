// Technical indicators module
pub mod rsi;
pub mod sma;

pub use rsi::Rsi;
pub use sma::Sma;

use serde_json::Value;
use shared::models::DailyBar;

// Common trait for all series indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, data: &[DailyBar]) -> Vec<Option<f64>>; // None where the window is not yet filled

    /// Value at the most recent bar, if the window is filled there.
    fn latest(&self, data: &[DailyBar]) -> Option<f64> {
        self.calculate(data).last().copied().flatten()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use shared::models::DailyBar;

    pub fn bar(day: u32, close: f64) -> DailyBar {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(day as i64);
        DailyBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
            amount: None,
        }
    }

    pub fn bars_from_closes(closes: &[f64]) -> Vec<DailyBar> {
        closes.iter().enumerate().map(|(i, c)| bar(i as u32, *c)).collect()
    }
}
