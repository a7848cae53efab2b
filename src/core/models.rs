use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorKind, LingoError};

/// Stable identifier of a submitted message. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&LingoError> for OperationError {
    fn from(error: &LingoError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub id: EntryId,
    pub source_text: String,
    pub created_at: DateTime<Utc>,
    pub detected_language: Option<String>,
    pub translation: Option<Translation>,
    pub summary: Option<String>,
    pub operation_error: Option<OperationError>,
}

impl MessageEntry {
    pub(crate) fn new(id: EntryId, source_text: String) -> Self {
        Self {
            id,
            source_text,
            created_at: Utc::now(),
            detected_language: None,
            translation: None,
            summary: None,
            operation_error: None,
        }
    }

    /// Length of the source text in characters, which is what the summary
    /// threshold is measured in.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.source_text.chars().count()
    }
}

/// Partial update applied to a single entry in one step.
///
/// `None` leaves a field alone. `operation_error: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub detected_language: Option<String>,
    pub translation: Option<Translation>,
    pub summary: Option<String>,
    pub operation_error: Option<Option<OperationError>>,
}

impl EntryPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detected_language.is_none()
            && self.translation.is_none()
            && self.summary.is_none()
            && self.operation_error.is_none()
    }

    pub(crate) fn apply(self, entry: &mut MessageEntry) {
        if let Some(language) = self.detected_language {
            entry.detected_language = Some(language);
        }
        if let Some(translation) = self.translation {
            entry.translation = Some(translation);
        }
        if let Some(summary) = self.summary {
            entry.summary = Some(summary);
        }
        if let Some(error) = self.operation_error {
            entry.operation_error = error;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Detect,
    Translate,
    Summarize,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Detect => "detect",
            Self::Translate => "translate",
            Self::Summarize => "summarize",
        };
        f.write_str(name)
    }
}

/// What a caller asks the controller to do for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    Detect,
    Translate { target_language: Option<String> },
    Summarize,
}

impl OperationRequest {
    #[must_use]
    pub fn translate_to(code: impl Into<String>) -> Self {
        Self::Translate {
            target_language: Some(code.into()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Detect => OperationKind::Detect,
            Self::Translate { .. } => OperationKind::Translate,
            Self::Summarize => OperationKind::Summarize,
        }
    }
}
