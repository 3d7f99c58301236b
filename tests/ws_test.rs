mod common;

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use rust_football_live::context::AppContext;
use rust_football_live::models::{ChatMessage, LiveScoreUpdate, ServerEnvelope, ServerMessageType};

use common::{fast_settings, live_game, seeded_context, spawn_server};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(context: &AppContext, game_id: &str) -> Client {
    let addr = spawn_server(context).await;
    let (ws, _) = connect_async(format!("ws://{addr}/ws/game/{game_id}"))
        .await
        .unwrap();
    ws
}

/// 指定の種類のエンベロープが来るまで読み進める
async fn next_of(ws: &mut Client, kind: ServerMessageType) -> ServerEnvelope {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let msg = ws.next().await.expect("stream ended").unwrap();
            if let Message::Text(text) = msg {
                let envelope: ServerEnvelope = serde_json::from_str(text.as_str()).unwrap();
                if envelope.kind == kind {
                    return envelope;
                }
            }
        }
    })
    .await
    .expect("expected message did not arrive")
}

#[tokio::test]
async fn test_unknown_game_closes_with_policy() {
    let context = seeded_context(None);
    let mut ws = connect(&context, "unknown-id").await;

    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    match msg {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Policy);
            assert_eq!(frame.reason.as_str(), "Game not found");
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_scheduled_game_ping_pong_without_updates() {
    let context = seeded_context(None);
    let mut ws = connect(&context, "upcoming-game-1").await;

    ws.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let envelope: ServerEnvelope = serde_json::from_str(msg.to_text().unwrap()).unwrap();
    assert_eq!(envelope.kind, ServerMessageType::Pong);

    // 開始前の試合にはスコア更新が来ない
    assert!(
        tokio::time::timeout(Duration::from_millis(200), ws.next())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_live_game_streams_score_updates() {
    let context = AppContext::new(fast_settings(20, 0.0), None);
    context.repo.put(live_game("g1", 30));
    assert!(context.simulator.start("g1"));

    let mut ws = connect(&context, "g1").await;

    let first = next_of(&mut ws, ServerMessageType::ScoreUpdate).await;
    let first: LiveScoreUpdate = serde_json::from_str(&first.payload).unwrap();
    assert_eq!(first.game_id, "g1");
    assert!(first.current_minute > 30);

    // 経過分は後退しない
    let second = next_of(&mut ws, ServerMessageType::ScoreUpdate).await;
    let second: LiveScoreUpdate = serde_json::from_str(&second.payload).unwrap();
    assert!(second.current_minute > first.current_minute);

    context.shutdown().await;
}

#[tokio::test]
async fn test_chat_message_over_websocket() {
    let context = seeded_context(None);
    let mut ws = connect(&context, "live-game-1").await;

    // payload はJSON文字列
    let payload = serde_json::json!({ "message": "Nice pass", "userId": "5" }).to_string();
    let request = serde_json::json!({ "type": "chat_message", "payload": payload });
    ws.send(Message::text(request.to_string())).await.unwrap();

    let reply = next_of(&mut ws, ServerMessageType::ChatMessage).await;
    let message: ChatMessage = serde_json::from_str(&reply.payload).unwrap();
    assert_eq!(message.username, "User 5");
    assert_eq!(message.message, "Nice pass");
    assert_eq!(message.game_id, "live-game-1");

    // オブジェクトをそのまま送ってきても受け付ける
    let request = serde_json::json!({
        "type": "chat_message",
        "payload": { "message": "Inline", "userId": "6" }
    });
    ws.send(Message::text(request.to_string())).await.unwrap();
    let reply = next_of(&mut ws, ServerMessageType::ChatMessage).await;
    let message: ChatMessage = serde_json::from_str(&reply.payload).unwrap();
    assert_eq!(message.message, "Inline");

    let chat = context.repo.get_chat("live-game-1");
    assert_eq!(chat.len(), 12);
    assert_eq!(chat[11].user_id, "6");
}

#[tokio::test]
async fn test_malformed_message_keeps_connection_open() {
    let context = seeded_context(None);
    let mut ws = connect(&context, "live-game-2").await;

    ws.send(Message::text("not json")).await.unwrap();
    let error = next_of(&mut ws, ServerMessageType::Error).await;
    assert_eq!(error.payload, "Invalid message format");

    ws.send(Message::text(r#"{"type":"chat_message","payload":"{\"oops\":1}"}"#))
        .await
        .unwrap();
    next_of(&mut ws, ServerMessageType::Error).await;

    ws.send(Message::text(r#"{"type":"dance"}"#)).await.unwrap();
    next_of(&mut ws, ServerMessageType::Error).await;

    // まだ使える
    ws.send(Message::text(r#"{"type":"ping"}"#)).await.unwrap();
    next_of(&mut ws, ServerMessageType::Pong).await;
    assert_eq!(context.repo.get_chat("live-game-2").len(), 10);
}
