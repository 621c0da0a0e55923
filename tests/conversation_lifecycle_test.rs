//! Integration tests for creating, selecting, renaming, deleting and
//! cleaning up conversations.

mod common;

use common::*;
use fbot::models::NO_MESSAGES_PLACEHOLDER;
use fbot::state::{ConversationPhase, NoticeLevel};
use serde_json::json;

fn listed_backend() -> MockBackend {
    MockBackend::new().with_conversations(json!([
        server_conversation("empty", "Draft", 0, NO_MESSAGES_PLACEHOLDER),
        server_conversation("c1", "Calculus", 4, "Thanks"),
        server_conversation("c2", "", 2, "See you"),
    ]))
}

#[tokio::test]
async fn test_load_drops_empty_and_selects_first_with_messages() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .build();
    let mut chat = chat_session(&mock);

    assert!(chat.load_conversations().await);

    let ids: Vec<_> = chat.conversations().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
    assert_eq!(chat.selected_id(), Some("c1"));
    assert_eq!(chat.conversations().get("c2").unwrap().title, "New conversation");
    assert_eq!(chat.transcript().len(), 1);
}

#[tokio::test]
async fn test_load_failure_is_fail_open() {
    let mock = MockBackend::new()
        .with_status("GET", "/chatbot/conversations", 500, json!({"error": "db"}))
        .build();
    let mut chat = chat_session(&mock);

    assert!(!chat.load_conversations().await);
    assert!(chat.transcript().has_only_welcome());
    assert_eq!(chat.notices().latest().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_create_prepends_and_selects_without_greeting() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_created("c9")
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;

    assert_eq!(chat.create_conversation().await.as_deref(), Some("c9"));

    assert_eq!(chat.conversations().iter().next().unwrap().id, "c9");
    assert_eq!(chat.selected_id(), Some("c9"));
    assert!(chat.transcript().is_empty());
}

#[tokio::test]
async fn test_delete_404_counts_as_deleted() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_status("DELETE", "/chatbot/conversations/c2", 404, json!({"error": "not found"}))
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;

    assert!(chat.delete_conversation("c2").await);

    assert!(chat.conversations().get("c2").is_none());
    assert_eq!(chat.conversations().phase("c2"), Some(ConversationPhase::Removed));
    assert_eq!(chat.selected_id(), Some("c1"));
    assert!(!chat.select_conversation("c2").await);
}

#[tokio::test]
async fn test_deleting_selected_conversation_starts_a_new_one() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_created("c3")
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;

    assert!(chat.delete_conversation("c1").await);

    assert!(chat.conversations().get("c1").is_none());
    assert_eq!(chat.selected_id(), Some("c3"));
    assert!(chat.transcript().is_empty());
}

#[tokio::test]
async fn test_rename_failure_keeps_local_title_until_retry() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_status(
            "PUT",
            "/chatbot/conversations/c1/title",
            500,
            json!({"error": "db"}),
        )
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;

    assert!(!chat.rename_conversation("c1", "Exam prep").await);

    let conv = chat.conversations().get("c1").unwrap();
    assert_eq!(conv.title, "Exam prep");
    assert!(conv.title_sync_pending);
    assert_eq!(chat.conversations().phase("c1"), Some(ConversationPhase::Active));

    // Backend recovers
    mock.set_response(
        "PUT",
        &url("/chatbot/conversations/c1/title"),
        MockResponse::json(200, json!({"success": true})),
    );
    assert_eq!(chat.retry_title_sync().await, 1);

    let conv = chat.conversations().get("c1").unwrap();
    assert_eq!(conv.title, "Exam prep");
    assert!(!conv.title_sync_pending);
    assert_eq!(chat.retry_title_sync().await, 0);
}

#[tokio::test]
async fn test_rename_rejected_by_envelope_is_pending() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_status(
            "PUT",
            "/chatbot/conversations/c1/title",
            200,
            json!({"success": false, "message": "title too long"}),
        )
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;

    assert!(!chat.rename_conversation("c1", "Long title").await);
    assert!(chat.conversations().get("c1").unwrap().title_sync_pending);
}

#[tokio::test]
async fn test_cleanup_reports_count_and_reloads() {
    let mock = listed_backend()
        .with_history("c1", json!([]))
        .with_status(
            "DELETE",
            "/chatbot/conversations/cleanup/empty",
            200,
            json!({"success": true, "data": {"deletedCount": 3}}),
        )
        .build();
    let mut chat = chat_session(&mock);

    assert_eq!(chat.cleanup_empty_conversations().await, Some(3));
    assert_eq!(chat.conversations().len(), 2);
    assert_eq!(
        mock.requests_to("GET", &url("/chatbot/conversations")).len(),
        1
    );
}

#[tokio::test]
async fn test_selecting_with_failed_history_shows_welcome() {
    let mock = listed_backend()
        .with_status(
            "GET",
            "/chatbot/conversations/c1/history",
            503,
            json!({"error": "busy"}),
        )
        .build();
    let mut chat = chat_session(&mock);

    chat.load_conversations().await;

    assert_eq!(chat.selected_id(), Some("c1"));
    assert!(chat.transcript().has_only_welcome());
    assert!(chat.transcript().messages()[0].content.starts_with("Hello Lan!"));
}

#[tokio::test]
async fn test_pending_rename_survives_cleanup_reload() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_status(
            "PUT",
            "/chatbot/conversations/c2/title",
            500,
            json!({"error": "db"}),
        )
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;

    assert!(!chat.rename_conversation("c2", "Optics").await);
    assert!(chat.cleanup_empty_conversations().await.is_some());

    let conv = chat.conversations().get("c2").unwrap();
    assert_eq!(conv.title, "Optics");
    assert!(conv.title_sync_pending);
    assert_eq!(
        chat.conversations().pending_title_syncs(),
        vec![("c2".to_string(), "Optics".to_string())]
    );
}

#[tokio::test]
async fn test_reload_never_lowers_message_count() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_reply(&[r#"{"type":"final","content":"ok"}"#])
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;
    chat.send_message("one more").await.unwrap();
    assert_eq!(chat.conversations().get("c1").unwrap().message_count, 6);

    // The backend list still reports the old count
    assert!(chat.refresh_conversations().await);
    assert_eq!(chat.conversations().get("c1").unwrap().message_count, 6);
}

#[tokio::test]
async fn test_refresh_keeps_current_selection() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_history("c2", json!([{"role": "user", "content": "see you"}]))
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;
    assert!(chat.select_conversation("c2").await);

    assert!(chat.refresh_conversations().await);

    assert_eq!(chat.selected_id(), Some("c2"));
    assert_eq!(chat.transcript().last().unwrap().content, "see you");
    assert_eq!(
        mock.requests_to("GET", &url("/chatbot/conversations/c1/history")).len(),
        1
    );
}

#[tokio::test]
async fn test_refresh_keeps_new_empty_conversation() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .with_created("c9")
        .build();
    let mut chat = chat_session(&mock);
    chat.load_conversations().await;
    chat.create_conversation().await;

    assert!(chat.refresh_conversations().await);

    assert_eq!(chat.selected_id(), Some("c9"));
    assert!(chat.conversations().get("c9").is_some());
}

#[tokio::test]
async fn test_refresh_without_selection_picks_first_with_messages() {
    let mock = listed_backend()
        .with_history("c1", json!([{"role": "user", "content": "hi"}]))
        .build();
    let mut chat = chat_session(&mock);

    assert!(chat.refresh_conversations().await);
    assert_eq!(chat.selected_id(), Some("c1"));
}
