use serde::{Deserialize, Serialize};
use tracing::debug;

use super::controller::{OperationController, RunOutcome};
use super::language::{DEFAULT_TARGET, normalize_code};
use super::models::{EntryId, OperationRequest};
use crate::errors::LingoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    Hidden,
    Selecting { entry_id: EntryId },
}

/// Gates translation behind an explicit choice of target language.
///
/// Only one selection can be open at a time.
#[derive(Debug, Clone)]
pub struct LanguageSelectionFlow {
    state: SelectionState,
    last_target: String,
}

impl Default for LanguageSelectionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageSelectionFlow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SelectionState::Hidden,
            last_target: DEFAULT_TARGET.to_string(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SelectionState {
        self.state
    }

    #[must_use]
    pub const fn is_selecting(&self) -> bool {
        matches!(self.state, SelectionState::Selecting { .. })
    }

    /// Language to preselect in the prompt: the last one chosen.
    #[must_use]
    pub fn suggested_target(&self) -> &str {
        &self.last_target
    }

    /// Opens the prompt for `entry_id`. Returns `false` and changes nothing if
    /// a selection is already open.
    pub fn request_translate(&mut self, entry_id: EntryId) -> bool {
        match self.state {
            SelectionState::Hidden => {
                self.state = SelectionState::Selecting { entry_id };
                true
            }
            SelectionState::Selecting { entry_id: open } => {
                debug!(%open, requested = %entry_id, "Language selection already open");
                false
            }
        }
    }

    /// Closes the prompt without translating. Returns the entry it was open for.
    pub fn cancel(&mut self) -> Option<EntryId> {
        match std::mem::replace(&mut self.state, SelectionState::Hidden) {
            SelectionState::Selecting { entry_id } => Some(entry_id),
            SelectionState::Hidden => None,
        }
    }

    /// Closes the prompt and translates the selected entry into `language_code`.
    ///
    /// # Errors
    ///
    /// `NoSelection` if no prompt is open; otherwise whatever
    /// `OperationController::run` rejects with.
    pub async fn choose(
        &mut self,
        controller: &OperationController,
        language_code: &str,
    ) -> Result<RunOutcome, LingoError> {
        let SelectionState::Selecting { entry_id } = self.state else {
            return Err(LingoError::NoSelection);
        };
        self.state = SelectionState::Hidden;

        if let Some(code) = normalize_code(language_code) {
            self.last_target = code;
        }
        controller
            .run(entry_id, OperationRequest::translate_to(language_code))
            .await
    }
}
