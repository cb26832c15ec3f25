// Simple Moving Average (SMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::DailyBar;

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("SMA period must be greater than 0");
        }
        Self {
            name: format!("SMA({})", period),
            period,
        }
    }

    /// SMA of close for the window ending at `end` (inclusive).
    pub fn value_at(&self, data: &[DailyBar], end: usize) -> Option<f64> {
        if end >= data.len() || end + 1 < self.period {
            return None;
        }
        let window = &data[end + 1 - self.period..=end];
        Some(window.iter().map(|b| b.close).sum::<f64>() / self.period as f64)
    }
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[DailyBar]) -> Vec<Option<f64>> {
        if data.len() < self.period {
            return vec![None; data.len()];
        }

        let mut results = vec![None; self.period - 1]; // No SMA for initial period

        // Calculate sum for the first window
        let mut sum: f64 = data.iter().take(self.period).map(|b| b.close).sum();
        results.push(Some(sum / self.period as f64));

        // Slide the window
        for i in self.period..data.len() {
            sum = sum - data[i - self.period].close + data[i].close;
            results.push(Some(sum / self.period as f64));
        }
        results
    }

    fn latest(&self, data: &[DailyBar]) -> Option<f64> {
        self.value_at(data, data.len().checked_sub(1)?)
    }
}
