//! Calorie counter error types

/// Errors surfaced by services, repositories and configuration loading.
///
/// The intake cache never produces these: cache operations are total and a
/// cache fault degrades to a miss.
#[derive(Debug, thiserror::Error)]
pub enum CalorieError {
    // Lookup errors
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness rule was violated (duplicate email, duplicate food name).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Backing store errors
    #[error("storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CalorieError {
    pub(crate) fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        CalorieError::NotFound(format!("{what} not found with id: {id}"))
    }
}

/// Result type alias for calorie counter operations
pub type Result<T> = std::result::Result<T, CalorieError>;
