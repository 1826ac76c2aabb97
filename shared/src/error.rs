//! Error types for the lunar reminder Lambda functions.

use thiserror::Error;

use crate::lunar::LunarError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Lambda functions.
#[derive(Error, Debug)]
pub enum Error {
    /// Calendar conversion error
    #[error(transparent)]
    Lunar(#[from] LunarError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Authorization error
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body or payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Lunar(LunarError::OutOfRange(_)) => 422,
            Error::Lunar(LunarError::InvalidOffset(_)) => 500,
            Error::Lunar(_) => 400,
            Error::Validation(_) | Error::Serialization(_) => 400,
            Error::Auth(_) => 401,
            Error::Unauthorized(_) => 403,
            Error::NotFound(_) => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(400, Error::from(LunarError::InvalidDate("2024-02-30".into())).status_code());
        assert_eq!(400, Error::from(LunarError::InvalidLunarDate("30/2".into())).status_code());
        assert_eq!(422, Error::from(LunarError::OutOfRange(1899)).status_code());
        assert_eq!(500, Error::from(LunarError::InvalidOffset("25".into())).status_code());
        assert_eq!(404, Error::NotFound("event".into()).status_code());
        assert_eq!(500, Error::Database(sqlx::Error::RowNotFound).status_code());
    }
}
