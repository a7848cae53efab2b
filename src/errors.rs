use std::time::Duration;

use openai_api_rs::v1::error::APIError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::EntryId;

#[derive(Debug, Error)]
pub enum LingoError {
    #[error("AI capability is not available: {0}")]
    CapabilityUnavailable(String),

    #[error("AI service rejected the request: {0}")]
    ServiceError(String),

    #[error("Invalid target language")]
    InvalidTarget,

    #[error("Another operation is already in progress")]
    Busy,

    #[error("Text is too short to summarize ({length} of {minimum} characters)")]
    TooShort { length: usize, minimum: usize },

    #[error("Only English text can be summarized (detected '{0}')")]
    NotEnglish(String),

    #[error("Choose a target language before translating")]
    NoTarget,

    #[error("Language was already detected as '{0}'")]
    AlreadyDetected(String),

    #[error("No message with id {0}")]
    NotFound(EntryId),

    #[error("No language selection is in progress")]
    NoSelection,

    #[error("AI service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to access preferences: {0}")]
    Preferences(String),
}

/// Failure categories recorded on a message entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CapabilityUnavailable,
    ServiceError,
    InvalidTarget,
    Busy,
    TooShort,
    NotEnglish,
    NoTarget,
    AlreadyDetected,
    NotFound,
    NoSelection,
    Timeout,
    Cancelled,
    Http,
    Config,
    Preferences,
}

impl LingoError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
            Self::ServiceError(_) => ErrorKind::ServiceError,
            Self::InvalidTarget => ErrorKind::InvalidTarget,
            Self::Busy => ErrorKind::Busy,
            Self::TooShort { .. } => ErrorKind::TooShort,
            Self::NotEnglish(_) => ErrorKind::NotEnglish,
            Self::NoTarget => ErrorKind::NoTarget,
            Self::AlreadyDetected(_) => ErrorKind::AlreadyDetected,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NoSelection => ErrorKind::NoSelection,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::HttpError(_) => ErrorKind::Http,
            Self::Config(_) => ErrorKind::Config,
            Self::Preferences(_) => ErrorKind::Preferences,
        }
    }

    /// Whether the failure happened while talking to the provider and so
    /// belongs on the entry, rather than being a rejected request.
    #[must_use]
    pub const fn is_processing_failure(&self) -> bool {
        matches!(
            self,
            Self::ServiceError(_) | Self::HttpError(_) | Self::Timeout(_) | Self::Cancelled
        )
    }
}

impl From<reqwest::Error> for LingoError {
    fn from(error: reqwest::Error) -> Self {
        LingoError::HttpError(error.to_string())
    }
}

impl From<anyhow::Error> for LingoError {
    fn from(error: anyhow::Error) -> Self {
        LingoError::ServiceError(error.to_string())
    }
}

impl From<APIError> for LingoError {
    fn from(error: APIError) -> Self {
        LingoError::ServiceError(format!("OpenAI API error: {error}"))
    }
}
