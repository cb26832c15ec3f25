// Per-candidate pipeline: history fetch, indicators, classification.
use chrono::NaiveDate;
use shared::models::InstrumentRef;
use std::time::Duration;

use crate::analysis::{classify, CandidateOutcome, IndicatorSet, SkipReason};
use crate::data::MarketDataProvider;

/// Inputs shared by every candidate of one scan.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisWindow {
    /// First date of history requested.
    pub from: NaiveDate,
    /// Bars after this date are ignored (replaying a past session).
    pub as_of: Option<NaiveDate>,
    pub min_bars: usize,
    pub fetch_timeout: Duration,
}

/// Never fails: every problem becomes a `Skipped` outcome.
pub async fn analyze_candidate(
    provider: &dyn MarketDataProvider,
    instrument: &InstrumentRef,
    window: AnalysisWindow,
) -> CandidateOutcome {
    let fetch = provider.daily_history(&instrument.code, window.from);
    let mut bars = match tokio::time::timeout(window.fetch_timeout, fetch).await {
        Ok(Ok(bars)) => bars,
        Ok(Err(e)) => {
            tracing::debug!(code = %instrument.code, error = %e, "History fetch failed, skipping candidate");
            return CandidateOutcome::Skipped(SkipReason::DataUnavailable { reason: e.to_string() });
        }
        Err(_) => {
            tracing::warn!(
                code = %instrument.code,
                timeout_ms = window.fetch_timeout.as_millis() as u64,
                "History fetch timed out, skipping candidate"
            );
            return CandidateOutcome::Skipped(SkipReason::TimedOut {
                after_ms: window.fetch_timeout.as_millis() as u64,
            });
        }
    };

    if let Some(as_of) = window.as_of {
        bars.retain(|b| b.date <= as_of);
    }

    let set = match IndicatorSet::compute_with_min_bars(&bars, window.min_bars) {
        Ok(set) => set,
        Err(reason) => {
            tracing::debug!(code = %instrument.code, %reason, "Skipping candidate");
            return CandidateOutcome::Skipped(reason);
        }
    };

    match classify(&set, instrument) {
        Some(result) => CandidateOutcome::Qualified(result),
        None => CandidateOutcome::NotQualified,
    }
}
