use serde::Serialize;
use shared::models::{Market, ScanResult};
use uuid::Uuid;

use crate::analysis::{CandidateOutcome, SkipReason};

/// Per-outcome counters; their sum is the number of attempted candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanTally {
    pub qualified: usize,
    pub not_qualified: usize,
    pub data_unavailable: usize,
    pub insufficient_history: usize,
    pub timed_out: usize,
}

impl ScanTally {
    pub fn record(&mut self, outcome: &CandidateOutcome) {
        match outcome {
            CandidateOutcome::Qualified(_) => self.qualified += 1,
            CandidateOutcome::NotQualified => self.not_qualified += 1,
            CandidateOutcome::Skipped(SkipReason::DataUnavailable { .. }) => self.data_unavailable += 1,
            CandidateOutcome::Skipped(SkipReason::InsufficientHistory { .. }) => self.insufficient_history += 1,
            CandidateOutcome::Skipped(SkipReason::TimedOut { .. }) => self.timed_out += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.data_unavailable + self.insufficient_history + self.timed_out
    }

    pub fn attempted(&self) -> usize {
        self.qualified + self.not_qualified + self.skipped()
    }
}

/// Final output of a scan. `results` is ranked by trend strength, strongest
/// first; an empty `results` means nothing qualified, not a failure.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub market: Market,
    /// Candidates selected for the scan.
    pub candidates: usize,
    /// Candidates actually analysed (fewer than `candidates` only if cancelled).
    pub attempted: usize,
    pub results: Vec<ScanResult>,
    pub tally: ScanTally,
    pub cancelled: bool,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Stable sort by trend strength, descending. Equal strengths keep the order
/// in which their candidates were processed.
pub fn rank_results(results: &mut [ScanResult]) {
    results.sort_by(|a, b| b.trend_strength.total_cmp(&a.trend_strength));
}
