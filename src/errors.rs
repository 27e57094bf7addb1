use crate::models::Level;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("STORE_FAILURE: {0}")]
    Store(String),
    #[error("MISSING_CONFIGURATION: {0}")]
    MissingConfiguration(String),
    #[error("NOT_A_DATE_PAGE: {0}")]
    NotADatePage(String),
    #[error("UNKNOWN_STREAM: {0}")]
    UnknownStream(String),
    #[error("TIMEOUT: gave up on {level} after {elapsed_ms}ms ({iterations} iterations)")]
    Timeout {
        level: Level,
        iterations: u32,
        elapsed_ms: u64,
    },
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
