#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lingo::ai::{AiServiceClient, CapabilityProvider, Detection, SummaryText, TranslatedText};
use lingo::errors::LingoError;
use tokio::sync::Notify;

pub const FIXED_SUMMARY: &str = "A short summary.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Detect(String),
    Translate {
        text: String,
        source: Option<String>,
        target: String,
    },
    Summarize {
        text: String,
        language: String,
    },
}

/// Holds a provider call open until the test releases it.
#[derive(Debug, Default)]
pub struct Gate {
    pub started: Notify,
    pub release: Notify,
}

/// Deterministic provider that records every call it receives.
#[derive(Debug)]
pub struct StubProvider {
    language: String,
    fail_next: Mutex<Option<String>>,
    gate: Option<Arc<Gate>>,
    calls: Mutex<Vec<Call>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            language: "en".to_string(),
            fail_next: Mutex::new(None),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_language(mut self, code: &str) -> Self {
        self.language = code.to_string();
        self
    }

    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// The next call fails with `ServiceError(message)`.
    pub fn fail_once(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn translate_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Translate { .. }))
            .collect()
    }

    async fn enter(&self, call: Call) -> Result<(), LingoError> {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        match self.fail_next.lock().unwrap().take() {
            Some(message) => Err(LingoError::ServiceError(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CapabilityProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn detect_language(&self, text: &str) -> Result<Detection, LingoError> {
        self.enter(Call::Detect(text.to_string())).await?;
        Ok(Detection {
            language: self.language.clone(),
        })
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<TranslatedText, LingoError> {
        self.enter(Call::Translate {
            text: text.to_string(),
            source: source_language.map(str::to_string),
            target: target_language.to_string(),
        })
        .await?;
        Ok(TranslatedText {
            text: format!("[{target_language}] {text}"),
        })
    }

    async fn summarize(&self, text: &str, language: &str) -> Result<SummaryText, LingoError> {
        self.enter(Call::Summarize {
            text: text.to_string(),
            language: language.to_string(),
        })
        .await?;
        Ok(SummaryText {
            text: FIXED_SUMMARY.to_string(),
        })
    }
}

pub fn client_for(stub: &Arc<StubProvider>) -> AiServiceClient {
    AiServiceClient::new(stub.clone())
}

/// English text comfortably over the summary threshold.
pub fn long_english() -> String {
    "The quick brown fox jumps over the lazy dog while the farmer watches from the porch. "
        .repeat(3)
        .trim()
        .to_string()
}
