use thiserror::Error;

/// Outcome taxonomy shared by every call that crosses the Riot API boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: RIOT_API_KEY is missing or was rejected")]
    Unauthorized,

    #[error("transient failure: {0}")]
    Transient(String),
}

impl ApiError {
    /// Only a credential failure should stop the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
