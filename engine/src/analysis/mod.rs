//! Per-instrument analysis: indicator snapshot, qualification and status.
pub mod classifier;
pub mod indicator_set;
pub mod outcome;

pub use classifier::{classify, qualifies, status_for};
pub use indicator_set::IndicatorSet;
pub use outcome::{CandidateOutcome, SkipReason};
