//! Message-processing core: storage, single-flight execution, language selection.

pub mod config;
pub mod controller;
pub mod language;
pub mod models;
pub mod preferences;
pub mod selection;
pub mod store;

pub use controller::{OperationController, OperationPhase, OperationResult, RunOutcome};
pub use models::{EntryId, MessageEntry, OperationKind, OperationRequest};
pub use selection::{LanguageSelectionFlow, SelectionState};
pub use store::MessageStore;
