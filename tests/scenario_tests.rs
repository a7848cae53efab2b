mod common;

use std::sync::Arc;

use common::{FIXED_SUMMARY, StubProvider, client_for};
use lingo::core::{
    LanguageSelectionFlow, OperationController, OperationRequest, OperationResult, RunOutcome,
    SelectionState,
};

fn english_text_of_len(len: usize) -> String {
    let base = "Rust makes it possible to write fast and reliable software. ";
    base.repeat(len / base.len() + 1).chars().take(len).collect()
}

#[tokio::test]
async fn detect_summarize_and_translate_end_to_end() {
    let stub = Arc::new(StubProvider::new());
    let controller = OperationController::new(client_for(&stub));

    // Short greeting: detected, but not summarizable.
    let hello = controller.submit("Hello").await.unwrap();
    assert_eq!(
        hello.detection.unwrap(),
        RunOutcome::Succeeded(OperationResult::Detected("en".to_string()))
    );
    assert_eq!(
        controller.entry(hello.id).unwrap().detected_language.as_deref(),
        Some("en")
    );
    assert!(!controller.can_summarize(hello.id));

    // 200 characters of English: summarize is allowed.
    let text = english_text_of_len(200);
    assert_eq!(text.chars().count(), 200);
    let long = controller.submit(&text).await.unwrap();
    assert!(controller.can_summarize(long.id));
    let summary = controller
        .run(long.id, OperationRequest::Summarize)
        .await
        .unwrap();
    assert!(summary.is_success());
    assert_eq!(
        controller.entry(long.id).unwrap().summary.as_deref(),
        Some(FIXED_SUMMARY)
    );

    // Translate through the selection flow.
    let mut flow = LanguageSelectionFlow::new();
    assert!(flow.request_translate(long.id));
    assert_eq!(
        flow.state(),
        SelectionState::Selecting { entry_id: long.id }
    );
    flow.choose(&controller, "fr").await.unwrap();

    let entry = controller.entry(long.id).unwrap();
    let translation = entry.translation.unwrap();
    assert_eq!(translation.target_language, "fr");
    assert_eq!(translation.text, format!("[fr] {text}"));
    assert_eq!(entry.operation_error, None);

    // Display order is submission order.
    let ids: Vec<_> = controller.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![hello.id, long.id]);
}
