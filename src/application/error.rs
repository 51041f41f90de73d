// Failure taxonomy for race fetching
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response: {0}")]
    Serialization(String),

    #[error("server responded with status {code}")]
    Server { code: i32 },

    #[error("unknown error: {0}")]
    Unknown(String),
}

pub type AppResult<T> = Result<T, AppError>;
