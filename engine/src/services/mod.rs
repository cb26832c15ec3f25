// Services exposed to callers (CLI, UI front-ends).
pub mod scan_service;

pub use scan_service::{ScanCancel, ScanProgress, ScanReport, ScanService, ScanTally};
