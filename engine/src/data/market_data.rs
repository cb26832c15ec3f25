// In-memory market data provider: listings per market and bars per code.
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{DailyBar, ListingRow, Market};
use std::collections::HashMap;

use super::provider::{normalize_bars, MarketDataProvider};
use crate::error::EngineError;

#[derive(Debug, Default, Clone)]
pub struct MarketDataStore {
    listings: HashMap<Market, Vec<ListingRow>>,
    bars: HashMap<String, Vec<DailyBar>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listing(&mut self, market: Market, rows: Vec<ListingRow>) {
        self.listings.insert(market, rows);
    }

    pub fn add_bars(&mut self, code: &str, new_bars: Vec<DailyBar>) {
        let series = self.bars.entry(code.to_string()).or_default();
        series.extend(new_bars);
        normalize_bars(series);
    }

    pub fn get_bars(&self, code: &str, from: Option<NaiveDate>) -> Option<Vec<DailyBar>> {
        self.bars.get(code).map(|bars| {
            bars.iter()
                .filter(|b| from.map_or(true, |start| b.date >= start))
                .cloned()
                .collect()
        })
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataStore {
    async fn list_universe(&self, market: Market) -> Result<Vec<ListingRow>, EngineError> {
        self.listings
            .get(&market)
            .cloned()
            .ok_or_else(|| EngineError::unavailable(market.as_str(), "no listing loaded for market"))
    }

    async fn daily_history(&self, code: &str, from: NaiveDate) -> Result<Vec<DailyBar>, EngineError> {
        match self.get_bars(code, Some(from)) {
            Some(bars) if !bars.is_empty() => Ok(bars),
            Some(_) => Err(EngineError::unavailable(code, format!("no bars since {}", from))),
            None => Err(EngineError::unavailable(code, "code not found")),
        }
    }
}
