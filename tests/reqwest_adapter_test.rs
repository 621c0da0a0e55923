//! End-to-end tests of the reqwest adapter against a local mock server.

use fbot::sse::StreamFrame;
use fbot::{
    ChatApiClient, ChatSession, ClientConfig, DeleteOutcome, ReqwestHttpClient, SendOutcome,
    SessionContext,
};
use futures::StreamExt;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .with_api_url(format!("{}/api", server.uri()))
        .with_access_token("wire-token")
}

fn client(server: &MockServer) -> ChatApiClient<ReqwestHttpClient> {
    let config = config(server);
    ChatApiClient::new(ReqwestHttpClient::new(), &config, SessionContext::init(&config))
}

#[tokio::test]
async fn test_full_exchange_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chatbot/conversations"))
        .and(header("Authorization", "Bearer wire-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "data": {"conversationId": "665f"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chatbot/chat"))
        .and(body_json(json!({"conversationId": "665f", "message": "Hello"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/event-stream")
                .set_body_string(
                    "data: {\"type\":\"chunk\",\"content\":\"He\"}\n\n\
                     data: {\"type\":\"final\",\"content\":\"Hello back\",\"agent\":\"generic_agent\"}\n\n",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chatbot/conversations/665f/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/chatbot/conversations/665f/title"))
        .and(body_json(json!({"title": "Hello"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut chat = ChatSession::new(ReqwestHttpClient::new(), &config(&server));
    let outcome = chat.send_message("Hello").await.unwrap();

    assert_eq!(
        outcome,
        SendOutcome::Replied {
            content: "Hello back".to_string()
        }
    );
    let conv = chat.conversations().get("665f").unwrap();
    assert_eq!(conv.title, "Hello");
    assert_eq!(conv.message_count, 2);
    assert!(chat.notices().is_empty());
}

#[tokio::test]
async fn test_stream_endpoint_frames() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "data: {\"type\":\"error\",\"content\":\"quota exceeded\"}\n\n",
        ))
        .mount(&server)
        .await;

    let frames: Vec<_> = client(&server)
        .send_message("c1", "hi", CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(
        frames,
        vec![Ok(StreamFrame::Error {
            content: "quota exceeded".to_string()
        })]
    );
}

#[tokio::test]
async fn test_stream_endpoint_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let result = client(&server)
        .send_message("c1", "hi", CancellationToken::new())
        .await;
    let err = result.err().unwrap();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_delete_not_found_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/chatbot/conversations/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let outcome = client(&server).delete_conversation("gone").await.unwrap();
    assert_eq!(outcome, DeleteOutcome::AlreadyGone);
}

#[tokio::test]
async fn test_history_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chatbot/conversations/c1/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"messages": [
                {"role": "user", "content": "hi", "timestamp": "2024-05-01T10:00:00.000Z"},
                {"role": "assistant", "content": "hello", "timestamp": 1714557605000i64}
            ]}
        })))
        .mount(&server)
        .await;

    let history = client(&server).conversation_history("c1").await.unwrap();
    assert_eq!(history.len(), 2);
    let reply = history[1].clone().to_client_message();
    assert_eq!(reply.agent.as_deref(), Some("generic_agent"));
    assert!(!reply.is_user());
}
