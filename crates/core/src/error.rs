// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Spooler error: {0}")]
    Spooler(#[from] crate::port::SpoolerError),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True when the error means "the addressed record does not exist"
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String) or AppError::NotFound

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::port::SpoolerError;

    #[test]
    fn test_conversions_pick_the_matching_variant() {
        let err: AppError = DomainError::InvalidTriggerStatus("paused".to_string()).into();
        assert!(matches!(err, AppError::Domain(_)));
        assert!(err.to_string().contains("paused"));

        let err: AppError = SpoolerError::Timeout {
            command: "lp".to_string(),
            secs: 10,
        }
        .into();
        assert!(matches!(err, AppError::Spooler(_)));

        let err: AppError = serde_json::from_str::<Vec<String>>("not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_is_not_found() {
        assert!(AppError::NotFound("Trigger 1".to_string()).is_not_found());
        assert!(!AppError::Database("locked".to_string()).is_not_found());
    }
}
