// engine/src/services/scan_service/mod.rs
// The ScanService struct and its public operations; the work itself lives in
// the sibling handler modules.
use chrono::{NaiveDate, Utc};
use shared::models::{InstrumentRef, Market};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{EngineSettings, MAX_LOOKBACK_DAYS};
use crate::data::MarketDataProvider;
use crate::error::EngineError;
use crate::selection::CandidateSelector;

pub mod analyze_candidate;
pub mod progress;
pub mod report;
pub mod run_scan;

pub use progress::{ScanCancel, ScanProgress};
pub use report::{ScanReport, ScanTally};

use analyze_candidate::AnalysisWindow;
use run_scan::{handle_run_scan, ScanPlan};

pub struct ScanService {
    provider: Arc<dyn MarketDataProvider>,
    selector: CandidateSelector,
    settings: EngineSettings,
    fetch_timeout: Duration,
    as_of: Option<NaiveDate>,
}

impl ScanService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: EngineSettings) -> Self {
        ScanService {
            selector: CandidateSelector::new(provider.clone(), &settings),
            fetch_timeout: Duration::from_secs(settings.fetch_timeout_secs),
            provider,
            settings,
            as_of: None,
        }
    }

    /// Evaluates every instrument as of the close of `date` instead of today.
    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn selector(&self) -> &CandidateSelector {
        &self.selector
    }

    /// Ordered candidates for `market`; `count` is clamped to the configured bounds.
    pub async fn select_candidates(&self, market: Market, count: usize) -> Result<Vec<InstrumentRef>, EngineError> {
        tracing::info!(%market, count, "Received select_candidates request");
        self.selector.select(market, self.settings.clamp_count(count)).await
    }

    /// Runs a full scan. Only a failure to obtain the universe listing is an
    /// error; per-candidate problems are counted in the report's tally.
    pub async fn run_scan<F>(&self, market: Market, count: usize, on_progress: F) -> Result<ScanReport, EngineError>
    where
        F: FnMut(&ScanProgress),
    {
        self.run_scan_with_cancel(market, count, &ScanCancel::new(), on_progress).await
    }

    pub async fn run_scan_with_cancel<F>(
        &self,
        market: Market,
        count: usize,
        cancel: &ScanCancel,
        on_progress: F,
    ) -> Result<ScanReport, EngineError>
    where
        F: FnMut(&ScanProgress),
    {
        let candidates = self.select_candidates(market, count).await?;
        let plan = ScanPlan {
            market,
            candidates,
            window: self.analysis_window(),
            max_concurrency: self.settings.max_concurrency,
        };
        Ok(handle_run_scan(self.provider.clone(), plan, cancel, on_progress).await)
    }

    fn analysis_window(&self) -> AnalysisWindow {
        let end = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let lookback = chrono::Duration::days(self.settings.lookback_days.clamp(1, MAX_LOOKBACK_DAYS));
        AnalysisWindow {
            from: end.checked_sub_signed(lookback).unwrap_or(NaiveDate::MIN),
            as_of: self.as_of,
            min_bars: self.settings.min_history_bars,
            fetch_timeout: self.fetch_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MarketDataStore;
    use async_trait::async_trait;
    use shared::models::{CellValue, DailyBar, ListingRow, ScanResult, SignalStatus};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    // One bar per calendar day ending at `as_of()`.
    fn series(closes: &[f64]) -> Vec<DailyBar> {
        let n = closes.len() as i64;
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| DailyBar {
                date: as_of() - chrono::Duration::days(n - 1 - i as i64),
                open: *close,
                high: close * 1.01,
                low: close * 0.99,
                close: *close,
                volume: 1000.0,
                amount: None,
            })
            .collect()
    }

    fn zigzag(up: f64, down: f64, n: usize) -> Vec<f64> {
        let mut v = 100.0;
        (0..n)
            .map(|i| {
                v *= if i % 2 == 0 { 1.0 + up } else { 1.0 - down };
                v
            })
            .collect()
    }

    fn listing_row(code: &str, market: Market, traded_value: f64) -> ListingRow {
        ListingRow {
            code: code.to_string(),
            name: format!("{} Inc", code),
            market,
            market_cap: CellValue::Number(1e12),
            close: CellValue::Number(100.0),
            traded_value: CellValue::Number(traded_value),
        }
    }

    // Ten Kospi candidates ranked C0..C9 by traded value, with a mix of outcomes.
    fn batch_store(missing: &[&str]) -> MarketDataStore {
        let mut store = MarketDataStore::new();
        let rows: Vec<ListingRow> = (0..10).map(|i| listing_row(&format!("C{}", i), Market::Kospi, 100.0 - i as f64)).collect();
        store.set_listing(Market::Kospi, rows);

        let up_strong = series(&zigzag(0.04, 0.025, 130));
        let up_mild = series(&zigzag(0.03, 0.02, 130));
        let flat = series(&vec![100.0; 130]);
        for i in 0..10 {
            let code = format!("C{}", i);
            if missing.contains(&code.as_str()) {
                continue;
            }
            let bars = match i % 3 {
                0 => up_strong.clone(),
                1 => up_mild.clone(),
                _ => flat.clone(),
            };
            store.add_bars(&code, bars);
        }
        store
    }

    fn service(store: MarketDataStore, settings: EngineSettings) -> ScanService {
        ScanService::new(Arc::new(store), settings).with_as_of(as_of())
    }

    fn codes(results: &[ScanResult]) -> Vec<&str> {
        results.iter().map(|r| r.code.as_str()).collect()
    }

    #[tokio::test]
    async fn test_run_scan_ranks_and_tallies() {
        let scan = service(batch_store(&[]), EngineSettings::default());
        let report = scan.run_scan(Market::Kospi, 10, |_| {}).await.unwrap();

        assert_eq!(report.candidates, 10);
        assert_eq!(report.attempted, 10);
        assert!(!report.cancelled);
        // C0, C3, C6, C9 strong; C1, C4, C7 mild; flat ones never qualify.
        assert_eq!(codes(&report.results), vec!["C0", "C3", "C6", "C9", "C1", "C4", "C7"]);
        assert!(report.results[..4].iter().all(|r| r.status == SignalStatus::StrongBuy));
        assert!(report.results[4..].iter().all(|r| r.status == SignalStatus::BuyTiming));
        assert_eq!(report.tally.qualified, 7);
        assert_eq!(report.tally.not_qualified, 3);
        assert_eq!(report.tally.attempted(), report.attempted);
        for pair in report.results.windows(2) {
            assert!(pair[0].trend_strength >= pair[1].trend_strength);
        }
    }

    #[tokio::test]
    async fn test_one_failed_fetch_does_not_stop_scan() {
        let scan = service(batch_store(&["C4"]), EngineSettings::default());
        let mut progress = Vec::new();
        let report = scan
            .run_scan(Market::Kospi, 10, |p| progress.push((p.fraction(), p.current_name.clone())))
            .await
            .unwrap();

        assert_eq!(report.attempted, 10);
        assert_eq!(report.tally.data_unavailable, 1);
        assert!(!codes(&report.results).contains(&"C4"));
        assert_eq!(report.results.len(), 6);

        assert_eq!(progress.len(), 10);
        assert_eq!(progress[4].1, "C4 Inc");
        assert!(progress.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(progress.last().unwrap().0, 1.0);
    }

    #[tokio::test]
    async fn test_concurrent_scan_matches_sequential() {
        let sequential = service(batch_store(&["C2"]), EngineSettings::default());
        let concurrent = service(
            batch_store(&["C2"]),
            EngineSettings { max_concurrency: 4, ..EngineSettings::default() },
        );

        let a = sequential.run_scan(Market::Kospi, 10, |_| {}).await.unwrap();
        let mut completed = Vec::new();
        let b = concurrent.run_scan(Market::Kospi, 10, |p| completed.push(p.completed)).await.unwrap();

        assert_eq!(a.results, b.results);
        assert_eq!(a.tally, b.tally);
        assert_eq!(completed, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_insufficient_history_is_skipped() {
        let mut store = MarketDataStore::new();
        store.set_listing(Market::Kospi, vec![listing_row("SHORT", Market::Kospi, 1.0)]);
        store.add_bars("SHORT", series(&zigzag(0.04, 0.025, 119)));
        let report = service(store, EngineSettings::default()).run_scan(Market::Kospi, 5, |_| {}).await.unwrap();
        assert!(report.is_empty());
        assert_eq!(report.tally.insufficient_history, 1);
    }

    #[tokio::test]
    async fn test_history_window_excludes_old_bars() {
        // Bars older than the 365-day lookback are not requested, leaving too few.
        let mut store = MarketDataStore::new();
        store.set_listing(Market::Kospi, vec![listing_row("OLD", Market::Kospi, 1.0)]);
        let closes = zigzag(0.04, 0.025, 130);
        let old: Vec<DailyBar> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| DailyBar {
                date: as_of() - chrono::Duration::days(700 - i as i64 * 5),
                open: *c,
                high: *c,
                low: *c,
                close: *c,
                volume: 1.0,
                amount: None,
            })
            .collect();
        store.add_bars("OLD", old);
        let report = service(store, EngineSettings::default()).run_scan(Market::Kospi, 5, |_| {}).await.unwrap();
        assert_eq!(report.tally.insufficient_history, 1);
    }

    #[tokio::test]
    async fn test_empty_universe_is_not_an_error() {
        let mut store = MarketDataStore::new();
        store.set_listing(Market::Nasdaq, Vec::new());
        let mut calls = 0;
        let report = service(store, EngineSettings::default())
            .run_scan(Market::Nasdaq, 20, |_| calls += 1)
            .await
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.attempted, 0);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_listing_failure_is_an_error() {
        let result = service(MarketDataStore::new(), EngineSettings::default())
            .run_scan(Market::Kosdaq, 20, |_| {})
            .await;
        assert!(matches!(result, Err(EngineError::DataUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_cancel_between_candidates() {
        let scan = service(batch_store(&[]), EngineSettings::default());
        let cancel = ScanCancel::new();
        let trigger = cancel.clone();
        let report = scan
            .run_scan_with_cancel(Market::Kospi, 10, &cancel, |p| {
                if p.completed == 3 {
                    trigger.cancel();
                }
            })
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.attempted, 3);
        assert_eq!(codes(&report.results), vec!["C0", "C1"]);
    }

    #[tokio::test]
    async fn test_cancel_with_concurrency_drains_in_flight() {
        let settings = EngineSettings { max_concurrency: 4, ..EngineSettings::default() };
        let scan = service(batch_store(&[]), settings);
        let cancel = ScanCancel::new();
        let trigger = cancel.clone();
        let report = scan
            .run_scan_with_cancel(Market::Kospi, 10, &cancel, |_| trigger.cancel())
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.candidates, 10);
        // The first four are already in flight when the flag is set; they finish, nothing new starts.
        assert_eq!(report.attempted, 4);
        assert_eq!(report.tally.attempted(), report.attempted);
        assert!(report.results.windows(2).all(|w| w[0].trend_strength >= w[1].trend_strength));
        assert_eq!(codes(&report.results), vec!["C0", "C3", "C1"]);
    }

    #[tokio::test]
    async fn test_oversized_lookback_does_not_panic() {
        let settings = EngineSettings { lookback_days: i64::MAX / 1_000_000, ..EngineSettings::default() };
        let scan = service(batch_store(&[]), settings);
        let report = scan.run_scan(Market::Kospi, 3, |_| {}).await.unwrap();
        assert_eq!(report.attempted, 3);
    }

    #[tokio::test]
    async fn test_count_is_clamped() {
        let scan = service(batch_store(&[]), EngineSettings { max_scan_count: 4, ..EngineSettings::default() });
        assert_eq!(scan.select_candidates(Market::Kospi, 100).await.unwrap().len(), 4);
        assert_eq!(scan.select_candidates(Market::Kospi, 0).await.unwrap().len(), 1);
    }

    struct SlowProvider {
        inner: MarketDataStore,
    }

    #[async_trait]
    impl MarketDataProvider for SlowProvider {
        async fn list_universe(&self, market: Market) -> Result<Vec<ListingRow>, EngineError> {
            self.inner.list_universe(market).await
        }

        async fn daily_history(&self, code: &str, from: NaiveDate) -> Result<Vec<DailyBar>, EngineError> {
            if code == "C1" {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.inner.daily_history(code, from).await
        }
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out_and_scan_continues() {
        let provider = Arc::new(SlowProvider { inner: batch_store(&[]) });
        let scan = ScanService::new(provider, EngineSettings::default())
            .with_as_of(as_of())
            .with_fetch_timeout(Duration::from_millis(50));
        let report = scan.run_scan(Market::Kospi, 3, |_| {}).await.unwrap();

        assert_eq!(report.attempted, 3);
        assert_eq!(report.tally.timed_out, 1);
        assert_eq!(codes(&report.results), vec!["C0"]);
    }
}
