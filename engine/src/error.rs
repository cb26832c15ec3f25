use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    // Provider listing or history lookup failed (unknown code, unreachable source, ...)
    #[error("Market data unavailable for '{code}': {reason}")]
    DataUnavailable { code: String, reason: String },

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    pub fn unavailable(code: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::DataUnavailable {
            code: code.into(),
            reason: reason.into(),
        }
    }
}
