//! The market-data seam. The scanner only ever talks to a provider through
//! these two calls; caching and rate limiting are the provider's business.
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::models::{DailyBar, ListingRow, Market};

use crate::error::EngineError;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Snapshot listing of the market's instruments. Numeric cells arrive as
    /// the source formats them and are coerced by the candidate selector.
    async fn list_universe(&self, market: Market) -> Result<Vec<ListingRow>, EngineError>;

    /// Daily bars for `code` from `from` through the latest session, ascending
    /// by date.
    async fn daily_history(&self, code: &str, from: NaiveDate) -> Result<Vec<DailyBar>, EngineError>;
}

/// Sorts bars ascending and keeps the first bar of any duplicated date.
pub fn normalize_bars(bars: &mut Vec<DailyBar>) {
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
}
