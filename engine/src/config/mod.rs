pub mod settings;

pub use settings::{EngineSettings, MAX_LISTING_TTL_SECS, MAX_LOOKBACK_DAYS};
