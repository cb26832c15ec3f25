use chrono::{DateTime, Duration, Utc};
use shared::models::{ListingRow, Market};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CacheEntry {
    rows: Arc<Vec<ListingRow>>,
    expires_at: DateTime<Utc>,
}

/// Universe listings per market, each valid for a fixed TTL from the moment
/// it was stored. Callers pass the clock explicitly.
#[derive(Debug, Clone)]
pub struct ListingCache {
    entries: HashMap<Market, CacheEntry>,
    ttl: Duration,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached listing for `market` if it has not expired at `now`.
    pub fn get_at(&self, market: Market, now: DateTime<Utc>) -> Option<Arc<Vec<ListingRow>>> {
        self.entries
            .get(&market)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.rows.clone())
    }

    pub fn insert_at(&mut self, market: Market, rows: Arc<Vec<ListingRow>>, now: DateTime<Utc>) {
        let entry = CacheEntry {
            rows,
            // An expiry past the calendar range leaves the entry stale at once.
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(now),
        };
        self.entries.insert(market, entry);
    }

    pub fn invalidate(&mut self, market: Market) {
        self.entries.remove(&market);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops entries already expired at `now`.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| now < entry.expires_at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::models::CellValue;

    fn listing(code: &str) -> Arc<Vec<ListingRow>> {
        Arc::new(vec![ListingRow {
            code: code.to_string(),
            name: code.to_string(),
            market: Market::Kospi,
            market_cap: CellValue::Empty,
            close: CellValue::Empty,
            traded_value: CellValue::Empty,
        }])
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let mut cache = ListingCache::new(Duration::seconds(3600));
        cache.insert_at(Market::Kospi, listing("A"), t0());

        assert!(cache.get_at(Market::Kospi, t0()).is_some());
        assert!(cache.get_at(Market::Kospi, t0() + Duration::seconds(3599)).is_some());
        assert!(cache.get_at(Market::Kospi, t0() + Duration::seconds(3600)).is_none());
        assert!(cache.get_at(Market::Kosdaq, t0()).is_none());
    }

    #[test]
    fn test_ttl_past_calendar_range_does_not_panic() {
        let mut cache = ListingCache::new(Duration::seconds(100_000_000_000_000));
        cache.insert_at(Market::Kospi, listing("A"), t0());
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at(Market::Kospi, t0()).is_none());
    }

    #[test]
    fn test_insert_refreshes_expiry() {
        let mut cache = ListingCache::new(Duration::seconds(60));
        cache.insert_at(Market::Kospi, listing("A"), t0());
        cache.insert_at(Market::Kospi, listing("B"), t0() + Duration::seconds(50));
        let rows = cache.get_at(Market::Kospi, t0() + Duration::seconds(100)).unwrap();
        assert_eq!(rows[0].code, "B");
    }

    #[test]
    fn test_invalidate_and_purge() {
        let mut cache = ListingCache::new(Duration::seconds(60));
        cache.insert_at(Market::Kospi, listing("A"), t0());
        cache.insert_at(Market::Nasdaq, listing("N"), t0() + Duration::seconds(30));

        cache.purge_expired(t0() + Duration::seconds(70));
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at(Market::Nasdaq, t0() + Duration::seconds(70)).is_some());

        cache.invalidate(Market::Nasdaq);
        assert!(cache.is_empty());
    }
}
