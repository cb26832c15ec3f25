// Relative Strength Index (RSI) indicator implementation.
// Average gain and loss are plain means over the trailing window of
// close-to-close changes (no Wilder smoothing).
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::DailyBar;

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI({})", period),
            period,
        }
    }

    /// RSI for the window of `period` changes ending at bar `end` (inclusive).
    pub fn value_at(&self, data: &[DailyBar], end: usize) -> Option<f64> {
        if self.period == 0 || end >= data.len() || end < self.period {
            return None;
        }

        let mut gains = 0.0;
        let mut losses = 0.0;
        for i in (end + 1 - self.period)..=end {
            let change = data[i].close - data[i - 1].close;
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change; // losses are positive values
            }
        }

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;
        Some(rsi_from_averages(avg_gain, avg_loss))
    }
}

/// Maps average gain/loss to RSI. No losses in the window means RSI 100,
/// including a window with no movement at all.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[DailyBar]) -> Vec<Option<f64>> {
        (0..data.len()).map(|end| self.value_at(data, end)).collect()
    }

    fn latest(&self, data: &[DailyBar]) -> Option<f64> {
        self.value_at(data, data.len().checked_sub(1)?)
    }
}
