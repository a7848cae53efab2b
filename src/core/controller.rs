//! Single-flight execution of AI operations against stored messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::language::{SUMMARY_LANGUAGE, normalize_code};
use super::models::{
    EntryId, EntryPatch, MessageEntry, OperationError, OperationKind, OperationRequest,
    Translation,
};
use super::store::MessageStore;
use crate::ai::AiServiceClient;
use crate::errors::LingoError;

/// Minimum number of characters a message needs before it can be summarized.
pub const MIN_SUMMARY_CHARS: usize = 150;

/// Where the controller currently is in the lifecycle of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum OperationPhase {
    Idle,
    Running { entry_id: EntryId, kind: OperationKind },
    Succeeded { entry_id: EntryId, kind: OperationKind },
    Failed { entry_id: EntryId, kind: OperationKind },
}

/// Value produced by a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    Detected(String),
    Translated(Translation),
    Summarized(String),
}

impl OperationResult {
    fn into_patch(self) -> EntryPatch {
        let mut patch = EntryPatch {
            operation_error: Some(None),
            ..EntryPatch::default()
        };
        match self {
            Self::Detected(language) => patch.detected_language = Some(language),
            Self::Translated(translation) => patch.translation = Some(translation),
            Self::Summarized(summary) => patch.summary = Some(summary),
        }
        patch
    }
}

/// Result of a call that was accepted and reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded(OperationResult),
    /// The provider failed; the same error is now on the entry.
    Failed(OperationError),
}

impl RunOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }
}

/// A submitted message together with the outcome of its automatic detection.
#[derive(Debug)]
pub struct Submission {
    pub id: EntryId,
    pub detection: Result<RunOutcome, LingoError>,
}

/// Call ready to send, after preconditions have been checked.
enum PreparedCall {
    Detect,
    Translate {
        source: Option<String>,
        target: String,
    },
    Summarize {
        language: String,
    },
}

/// Serializes every call into the AI service and writes results back into the
/// message store.
///
/// At most one call is in flight at a time. A request made while busy is
/// rejected with `Busy`, never queued.
#[derive(Debug)]
pub struct OperationController {
    client: AiServiceClient,
    store: Mutex<MessageStore>,
    busy: AtomicBool,
    phase: Mutex<OperationPhase>,
    last_completion: Mutex<Option<OperationPhase>>,
    in_flight: Mutex<Option<CancellationToken>>,
    timeout: Option<Duration>,
}

/// Holds the busy flag; dropping it releases the flag on every exit path.
struct BusyGuard<'a> {
    controller: &'a OperationController,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *lock(&self.controller.in_flight) = None;
        *lock(&self.controller.phase) = OperationPhase::Idle;
        self.controller.busy.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OperationController {
    #[must_use]
    pub fn new(client: AiServiceClient) -> Self {
        Self::with_store(client, MessageStore::new())
    }

    #[must_use]
    pub fn with_store(client: AiServiceClient, store: MessageStore) -> Self {
        Self {
            client,
            store: Mutex::new(store),
            busy: AtomicBool::new(false),
            phase: Mutex::new(OperationPhase::Idle),
            last_completion: Mutex::new(None),
            in_flight: Mutex::new(None),
            timeout: None,
        }
    }

    /// Limits how long a single provider call may take.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// `Idle` or `Running`; terminal phases are reported by `last_completion`.
    #[must_use]
    pub fn phase(&self) -> OperationPhase {
        *lock(&self.phase)
    }

    #[must_use]
    pub fn last_completion(&self) -> Option<OperationPhase> {
        *lock(&self.last_completion)
    }

    #[must_use]
    pub fn entries(&self) -> Vec<MessageEntry> {
        lock(&self.store).list()
    }

    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<MessageEntry> {
        lock(&self.store).get(id)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        lock(&self.store).subscribe()
    }

    /// Stores a message without running any operation on it.
    pub fn append(&self, text: &str) -> Option<EntryId> {
        lock(&self.store).append(text)
    }

    pub fn delete(&self, id: EntryId) -> bool {
        lock(&self.store).delete(id)
    }

    /// Stores a message and immediately detects its language.
    ///
    /// Returns `None` for blank input. The entry is kept even if detection is
    /// rejected or fails.
    pub async fn submit(&self, text: &str) -> Option<Submission> {
        let id = self.append(text)?;
        let detection = self.run(id, OperationRequest::Detect).await;
        Some(Submission { id, detection })
    }

    /// Whether a summary can currently be requested for the entry.
    #[must_use]
    pub fn can_summarize(&self, id: EntryId) -> bool {
        self.entry(id).is_some_and(|entry| {
            entry.summary.is_none() && summary_precondition(&entry).is_ok()
        })
    }

    /// Trips the cancellation token of the call in flight, if any.
    pub fn cancel_in_flight(&self) -> bool {
        match lock(&self.in_flight).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Runs one operation against one entry.
    ///
    /// # Errors
    ///
    /// Rejections are returned as errors and leave the entry untouched:
    /// `Busy`, `NotFound`, `AlreadyDetected`, `TooShort`, `NotEnglish`,
    /// `NoTarget`, `InvalidTarget` and `CapabilityUnavailable`. Provider
    /// failures are not errors here; they are recorded on the entry and
    /// returned as `RunOutcome::Failed`.
    pub async fn run(
        &self,
        entry_id: EntryId,
        request: OperationRequest,
    ) -> Result<RunOutcome, LingoError> {
        let kind = request.kind();
        let _guard = self.acquire(entry_id, kind)?;

        let correlation_id = Uuid::new_v4();
        let span = info_span!("operation", %correlation_id, %entry_id, %kind);
        self.run_acquired(entry_id, request).instrument(span).await
    }

    fn acquire(&self, entry_id: EntryId, kind: OperationKind) -> Result<BusyGuard<'_>, LingoError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(%entry_id, %kind, "Rejecting operation while another is in flight");
            return Err(LingoError::Busy);
        }
        *lock(&self.phase) = OperationPhase::Running { entry_id, kind };
        Ok(BusyGuard { controller: self })
    }

    async fn run_acquired(
        &self,
        entry_id: EntryId,
        request: OperationRequest,
    ) -> Result<RunOutcome, LingoError> {
        let kind = request.kind();
        let entry = self.entry(entry_id).ok_or(LingoError::NotFound(entry_id))?;
        let prepared = prepare(&entry, request).inspect_err(|e| {
            debug!(error = %e, "Operation rejected by precondition");
        })?;

        let token = CancellationToken::new();
        *lock(&self.in_flight) = Some(token.clone());

        info!("Starting operation");
        let result = self.call_with_limits(&entry, prepared, &token).await;

        match result {
            Ok(value) => {
                let patched = lock(&self.store).patch(entry_id, value.clone().into_patch());
                self.complete(OperationPhase::Succeeded { entry_id, kind });
                if let Err(e) = patched {
                    warn!("Entry was removed before the result arrived");
                    return Err(e);
                }
                info!("Operation succeeded");
                Ok(RunOutcome::Succeeded(value))
            }
            Err(e) if e.is_processing_failure() => {
                warn!(error = %e, "Operation failed");
                let error = OperationError::from(&e);
                let patched = lock(&self.store).patch(
                    entry_id,
                    EntryPatch {
                        operation_error: Some(Some(error.clone())),
                        ..EntryPatch::default()
                    },
                );
                self.complete(OperationPhase::Failed { entry_id, kind });
                patched?;
                Ok(RunOutcome::Failed(error))
            }
            Err(e) => {
                warn!(error = %e, "Operation could not be performed");
                self.complete(OperationPhase::Failed { entry_id, kind });
                Err(e)
            }
        }
    }

    async fn call_with_limits(
        &self,
        entry: &MessageEntry,
        prepared: PreparedCall,
        token: &CancellationToken,
    ) -> Result<OperationResult, LingoError> {
        let call = self.call_provider(&entry.source_text, prepared);
        let limited = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| LingoError::Timeout(limit))?,
                None => call.await,
            }
        };

        tokio::select! {
            _ = token.cancelled() => Err(LingoError::Cancelled),
            result = limited => result,
        }
    }

    async fn call_provider(
        &self,
        text: &str,
        prepared: PreparedCall,
    ) -> Result<OperationResult, LingoError> {
        match prepared {
            PreparedCall::Detect => {
                let detection = self.client.detect_language(text).await?;
                Ok(OperationResult::Detected(detection.language))
            }
            PreparedCall::Translate { source, target } => {
                let translated = self
                    .client
                    .translate(text, source.as_deref(), &target)
                    .await?;
                Ok(OperationResult::Translated(Translation {
                    text: translated.text,
                    target_language: target,
                }))
            }
            PreparedCall::Summarize { language } => {
                let summary = self.client.summarize(text, &language).await?;
                Ok(OperationResult::Summarized(summary.text))
            }
        }
    }

    fn complete(&self, phase: OperationPhase) {
        *lock(&self.last_completion) = Some(phase);
    }
}

fn summary_precondition(entry: &MessageEntry) -> Result<String, LingoError> {
    let length = entry.char_len();
    if length < MIN_SUMMARY_CHARS {
        return Err(LingoError::TooShort {
            length,
            minimum: MIN_SUMMARY_CHARS,
        });
    }
    match entry.detected_language.as_deref() {
        Some(language) if language != SUMMARY_LANGUAGE => {
            Err(LingoError::NotEnglish(language.to_string()))
        }
        _ => Ok(SUMMARY_LANGUAGE.to_string()),
    }
}

fn prepare(entry: &MessageEntry, request: OperationRequest) -> Result<PreparedCall, LingoError> {
    match request {
        OperationRequest::Detect => match &entry.detected_language {
            Some(language) => Err(LingoError::AlreadyDetected(language.clone())),
            None => Ok(PreparedCall::Detect),
        },
        OperationRequest::Summarize => {
            summary_precondition(entry).map(|language| PreparedCall::Summarize { language })
        }
        OperationRequest::Translate { target_language } => {
            let raw = target_language
                .filter(|code| !code.trim().is_empty())
                .ok_or(LingoError::NoTarget)?;
            let target = normalize_code(&raw).ok_or(LingoError::InvalidTarget)?;
            Ok(PreparedCall::Translate {
                source: entry.detected_language.clone(),
                target,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, detected: Option<&str>) -> MessageEntry {
        let mut entry = MessageEntry::new(EntryId(1), text.to_string());
        entry.detected_language = detected.map(str::to_string);
        entry
    }

    #[test]
    fn summary_needs_length_threshold() {
        let short = entry(&"a".repeat(MIN_SUMMARY_CHARS - 1), None);
        assert!(matches!(
            prepare(&short, OperationRequest::Summarize),
            Err(LingoError::TooShort { length: 149, minimum: 150 })
        ));

        let exact = entry(&"a".repeat(MIN_SUMMARY_CHARS), None);
        assert!(prepare(&exact, OperationRequest::Summarize).is_ok());
    }

    #[test]
    fn summary_needs_english_once_detected() {
        let spanish = entry(&"a".repeat(200), Some("es"));
        assert!(matches!(
            prepare(&spanish, OperationRequest::Summarize),
            Err(LingoError::NotEnglish(ref code)) if code == "es"
        ));

        let english = entry(&"a".repeat(200), Some("en"));
        assert!(matches!(
            prepare(&english, OperationRequest::Summarize),
            Ok(PreparedCall::Summarize { ref language }) if language == "en"
        ));
    }

    #[test]
    fn translate_requires_a_target() {
        let e = entry("Hello", Some("en"));
        assert!(matches!(
            prepare(&e, OperationRequest::Translate { target_language: None }),
            Err(LingoError::NoTarget)
        ));
        assert!(matches!(
            prepare(&e, OperationRequest::translate_to("  ")),
            Err(LingoError::NoTarget)
        ));
        assert!(matches!(
            prepare(&e, OperationRequest::translate_to("French please")),
            Err(LingoError::InvalidTarget)
        ));
        assert!(matches!(
            prepare(&e, OperationRequest::translate_to("FR")),
            Ok(PreparedCall::Translate { ref target, ref source })
                if target == "fr" && source.as_deref() == Some("en")
        ));
    }

    #[test]
    fn detection_happens_once() {
        assert!(matches!(
            prepare(&entry("Hello", None), OperationRequest::Detect),
            Ok(PreparedCall::Detect)
        ));
        assert!(matches!(
            prepare(&entry("Hello", Some("en")), OperationRequest::Detect),
            Err(LingoError::AlreadyDetected(ref code)) if code == "en"
        ));
    }

    #[test]
    fn success_patch_clears_error() {
        let patch = OperationResult::Summarized("short".to_string()).into_patch();
        assert_eq!(patch.summary.as_deref(), Some("short"));
        assert_eq!(patch.operation_error, Some(None));
        assert_eq!(patch.translation, None);
    }
}
