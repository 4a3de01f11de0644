use std::time::Duration;

use cho_cuu_nong::clients::{
    build_http_client,
    chat_relay::{ChatRelay, RelayError},
};
use httpmock::prelude::*;
use serde_json::json;
use uuid::Uuid;

fn relay(server: &MockServer) -> ChatRelay {
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    ChatRelay::new(http, server.base_url())
}

#[tokio::test]
async fn posts_message_id_and_returns_reply() {
    let server = MockServer::start();
    let question_id = Uuid::new_v4();
    let reply_id = Uuid::new_v4();
    let buyer_id = Uuid::new_v4();

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/functions/v1/openai-message-sender")
            .header("authorization", "Bearer session-token")
            .json_body(json!({ "messageId": question_id }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": reply_id,
                "sender_id": null,
                "receiver_id": buyer_id,
                "bot_sender_id": "openai_virtual_assistant",
                "bot_receiver_id": null,
                "content": "Bạn có thể bảo quản rau trong ngăn mát.",
                "created_at": "2025-03-01T08:00:00Z",
                "updated_at": null
            }));
    });

    let reply = relay(&server)
        .request_reply("session-token", question_id)
        .await
        .unwrap();

    mock.assert();
    assert_eq!(reply.id, reply_id);
    assert_eq!(reply.receiver_id, Some(buyer_id));
    assert_eq!(reply.bot_sender_id.as_deref(), Some("openai_virtual_assistant"));
}

#[tokio::test]
async fn function_failure_surfaces_status() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/functions/v1/openai-message-sender");
        then.status(503).body("model overloaded");
    });

    let result = relay(&server).request_reply("t", Uuid::new_v4()).await;

    mock.assert();
    match result {
        Err(RelayError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "model overloaded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}
