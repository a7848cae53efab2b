//! Access to the external AI capability provider.
//!
//! `AiServiceClient` is the only thing the rest of the crate talks to. It
//! holds no mutable state, never retries, and reports a missing provider as
//! `CapabilityUnavailable`.

pub mod client;
pub mod prompt;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use client::LlmProvider;

use crate::core::config::AppConfig;
use crate::core::language::normalize_code;
use crate::errors::LingoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryText {
    pub text: String,
}

/// Something that can detect, translate and summarize text.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Provider name used in logs.
    fn name(&self) -> &str;

    async fn detect_language(&self, text: &str) -> Result<Detection, LingoError>;

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<TranslatedText, LingoError>;

    async fn summarize(&self, text: &str, language: &str) -> Result<SummaryText, LingoError>;
}

/// Facade over an optional capability provider.
#[derive(Clone, Default)]
pub struct AiServiceClient {
    provider: Option<Arc<dyn CapabilityProvider>>,
}

impl fmt::Debug for AiServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiServiceClient")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl AiServiceClient {
    #[must_use]
    pub fn new(provider: Arc<dyn CapabilityProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A client with no provider behind it; every call is `CapabilityUnavailable`.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP provider cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, LingoError> {
        Ok(Self::new(Arc::new(LlmProvider::new(config)?)))
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn CapabilityProvider>, LingoError> {
        self.provider.as_ref().ok_or_else(|| {
            LingoError::CapabilityUnavailable("no AI provider is configured".to_string())
        })
    }

    /// # Errors
    ///
    /// `CapabilityUnavailable` without a provider, `ServiceError` if the
    /// provider fails or answers with something that is not a language code.
    pub async fn detect_language(&self, text: &str) -> Result<Detection, LingoError> {
        let provider = self.provider()?;
        let detection = provider.detect_language(text).await?;
        let language = normalize_code(&detection.language).ok_or_else(|| {
            LingoError::ServiceError(format!(
                "provider returned an unrecognised language code: {:?}",
                detection.language
            ))
        })?;
        debug!(provider = provider.name(), %language, "Detected language");
        Ok(Detection { language })
    }

    /// # Errors
    ///
    /// `InvalidTarget` for an empty target, otherwise as `detect_language`.
    pub async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<TranslatedText, LingoError> {
        let target = target_language.trim();
        if target.is_empty() {
            return Err(LingoError::InvalidTarget);
        }
        let provider = self.provider()?;
        provider.translate(text, source_language, target).await
    }

    /// # Errors
    ///
    /// `CapabilityUnavailable` without a provider, `ServiceError` on failure.
    pub async fn summarize(&self, text: &str, language: &str) -> Result<SummaryText, LingoError> {
        let provider = self.provider()?;
        provider.summarize(text, language).await
    }
}
