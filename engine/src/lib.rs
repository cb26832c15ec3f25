// Engine library root: trend-following scanner core.
//
// selection  -> which instruments to look at
// indicators -> series math over daily bars
// analysis   -> indicator snapshot, trend filter, status label
// services   -> scan orchestration exposed to front-ends

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod selection;
pub mod services;
pub mod table;

pub use error::EngineError;
