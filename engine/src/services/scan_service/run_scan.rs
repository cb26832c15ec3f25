// Scan orchestration: fan candidates out (sequentially or with bounded
// concurrency), aggregate outcomes in one place, rank.
use shared::models::{InstrumentRef, Market, ScanResult};
use std::sync::Arc;
use tokio::task::JoinSet;
use uuid::Uuid;

use super::analyze_candidate::{analyze_candidate, AnalysisWindow};
use super::progress::{ScanCancel, ScanProgress};
use super::report::{rank_results, ScanReport, ScanTally};
use crate::analysis::{CandidateOutcome, SkipReason};
use crate::data::MarketDataProvider;

/// Progress name reported for a candidate whose task panicked.
pub const FAILED_TASK_NAME: &str = "<task failed>";

pub struct ScanPlan {
    pub market: Market,
    pub candidates: Vec<InstrumentRef>,
    pub window: AnalysisWindow,
    pub max_concurrency: usize,
}

pub async fn handle_run_scan<F>(
    provider: Arc<dyn MarketDataProvider>,
    plan: ScanPlan,
    cancel: &ScanCancel,
    mut on_progress: F,
) -> ScanReport
where
    F: FnMut(&ScanProgress),
{
    let scan_id = Uuid::new_v4();
    let total = plan.candidates.len();
    tracing::info!(
        %scan_id,
        market = %plan.market,
        candidates = total,
        concurrency = plan.max_concurrency,
        from = %plan.window.from,
        "Starting scan"
    );

    let mut aggregator = Aggregator::new(total);
    if plan.max_concurrency <= 1 {
        for (index, instrument) in plan.candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            let outcome = analyze_candidate(provider.as_ref(), instrument, plan.window).await;
            on_progress(&aggregator.record(index, &instrument.name, outcome));
        }
    } else {
        let mut in_flight = JoinSet::new();
        let mut pending = plan.candidates.iter().cloned().enumerate();
        loop {
            while in_flight.len() < plan.max_concurrency && !cancel.is_cancelled() {
                let Some((index, instrument)) = pending.next() else { break };
                let provider = provider.clone();
                let window = plan.window;
                in_flight.spawn(async move {
                    let outcome = analyze_candidate(provider.as_ref(), &instrument, window).await;
                    (index, instrument.name, outcome)
                });
            }

            let Some(joined) = in_flight.join_next().await else { break };
            let progress = match joined {
                Ok((index, name, outcome)) => aggregator.record(index, &name, outcome),
                Err(e) => {
                    tracing::error!(%scan_id, error = %e, "Candidate task failed");
                    aggregator.record_failed_task(e.to_string())
                }
            };
            on_progress(&progress);
        }
    }

    let cancelled = cancel.is_cancelled() && aggregator.completed < total;
    let report = aggregator.finish(scan_id, plan.market, cancelled);
    tracing::info!(
        %scan_id,
        market = %report.market,
        attempted = report.attempted,
        qualified = report.tally.qualified,
        skipped = report.tally.skipped(),
        cancelled = report.cancelled,
        "Scan finished"
    );
    report
}

// Single aggregation point: the only place outcomes are merged.
struct Aggregator {
    total: usize,
    completed: usize,
    tally: ScanTally,
    qualified: Vec<(usize, ScanResult)>,
}

impl Aggregator {
    fn new(total: usize) -> Self {
        Aggregator {
            total,
            completed: 0,
            tally: ScanTally::default(),
            qualified: Vec::new(),
        }
    }

    fn record(&mut self, index: usize, name: &str, outcome: CandidateOutcome) -> ScanProgress {
        self.tally.record(&outcome);
        if let Some(result) = outcome.into_result() {
            self.qualified.push((index, result));
        }
        self.advance(name.to_string())
    }

    // A panicked task loses its candidate; it still counts as attempted.
    fn record_failed_task(&mut self, reason: String) -> ScanProgress {
        self.tally.record(&CandidateOutcome::Skipped(SkipReason::DataUnavailable { reason }));
        self.advance(FAILED_TASK_NAME.to_string())
    }

    fn advance(&mut self, current_name: String) -> ScanProgress {
        self.completed += 1;
        ScanProgress {
            completed: self.completed,
            total: self.total,
            current_name,
        }
    }

    fn finish(mut self, scan_id: Uuid, market: Market, cancelled: bool) -> ScanReport {
        // Restore candidate order first so ranking ties are independent of completion order.
        self.qualified.sort_by_key(|(index, _)| *index);
        let mut results: Vec<ScanResult> = self.qualified.into_iter().map(|(_, r)| r).collect();
        rank_results(&mut results);

        ScanReport {
            scan_id,
            market,
            candidates: self.total,
            attempted: self.completed,
            results,
            tally: self.tally,
            cancelled,
        }
    }
}
