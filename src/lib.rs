//! Lingo - detect, translate and summarize submitted text through an AI provider.
//!
//! The crate is the message-processing core behind a text-processing front end:
//! 1. A `MessageStore` keeps submitted messages in display order
//! 2. An `OperationController` runs one AI call at a time against a message
//! 3. A `LanguageSelectionFlow` makes the user pick a target before translating
//!
//! # Architecture
//!
//! The system uses:
//! - an `AiServiceClient` facade over a pluggable `CapabilityProvider`
//! - reqwest + openai-api-rs for the bundled Responses API provider
//! - Tokio for async execution, timeouts and cancellation
//!
//! # Example
//!
//! ```no_run
//! use lingo::ai::AiServiceClient;
//! use lingo::core::config::AppConfig;
//! use lingo::core::{LanguageSelectionFlow, OperationController, OperationRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     lingo::setup_logging();
//!
//!     let config = AppConfig::from_env()?;
//!     let client = AiServiceClient::from_config(&config)?;
//!     let controller = OperationController::new(client).with_timeout(config.operation_timeout);
//!
//!     // Submitting detects the language straight away
//!     if let Some(submission) = controller.submit("Hello there").await {
//!         println!("detection: {:?}", submission.detection);
//!
//!         let mut flow = LanguageSelectionFlow::new();
//!         flow.request_translate(submission.id);
//!         let outcome = flow.choose(&controller, "fr").await?;
//!         println!("translation: {outcome:?}");
//!
//!         let summary = controller.run(submission.id, OperationRequest::Summarize).await;
//!         println!("summary: {summary:?}");
//!     }
//!
//!     Ok(())
//! }
//! ```
pub mod ai;
pub mod core;
pub mod errors;

pub use ai::prompt::estimate_tokens;
pub use errors::LingoError;

/// Configure structured logging with JSON output.
///
/// # Example
///
/// ```
/// lingo::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
