use serde::Serialize;
use shared::models::ScanResult;
use std::fmt;

/// Why a candidate produced no verdict. None of these abort a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Provider could not supply the history (lookup failure, bad data, ...).
    DataUnavailable { reason: String },
    InsufficientHistory { bars: usize, required: usize },
    TimedOut { after_ms: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DataUnavailable { reason } => write!(f, "data unavailable: {}", reason),
            SkipReason::InsufficientHistory { bars, required } => {
                write!(f, "insufficient history: {} bars, {} required", bars, required)
            }
            SkipReason::TimedOut { after_ms } => write!(f, "history fetch timed out after {}ms", after_ms),
        }
    }
}

/// Result of analysing one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Qualified(ScanResult),
    /// Analysed fine but the trend alignment filter rejected it.
    NotQualified,
    Skipped(SkipReason),
}

impl CandidateOutcome {
    pub fn into_result(self) -> Option<ScanResult> {
        match self {
            CandidateOutcome::Qualified(result) => Some(result),
            _ => None,
        }
    }
}
