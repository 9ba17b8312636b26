// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid trigger status: {0}")]
    InvalidTriggerStatus(String),

    #[error("Invalid print job status: {0}")]
    InvalidPrintJobStatus(String),

    #[error("Invalid probe URL: {0}")]
    InvalidProbeUrl(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
