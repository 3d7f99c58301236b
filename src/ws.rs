use axum::{
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::Response,
};

use crate::api::AppState;
use crate::bus::MatchSubscription;
use crate::models::{ChatMessageRequest, ClientEnvelope, ClientMessageType, ServerEnvelope};

/// WebSocketハンドラ
/// GET /ws/game/{gameId} を WebSocket にアップグレードする
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, game_id))
}

/// 1接続ぶんのセッション
///
/// - 試合が存在しなければ policy violation (1008) で閉じる
/// - その試合のスナップショットを score_update として送る
/// - chat_message / ping を受けてその場で返信する
/// - 不正なメッセージには error を返し、接続は切らない
///
/// 送信も受信も1つのループで扱うので、どの経路で抜けても購読は一緒に破棄される。
async fn handle_socket(mut socket: WebSocket, state: AppState, game_id: String) {
    if state.service.get_game(&game_id).await.is_none() {
        tracing::info!(game_id = %game_id, "rejecting websocket for unknown game");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "Game not found".into(),
            })))
            .await;
        return;
    }

    tracing::debug!(game_id = %game_id, "websocket connected");
    let mut updates: MatchSubscription = state.bus.subscribe(game_id.clone());

    loop {
        tokio::select! {
            // 1. この試合の新しいスナップショット
            update = updates.next() => {
                let Some(update) = update else {
                    break;
                };
                match ServerEnvelope::score_update(&update) {
                    Ok(envelope) => {
                        // 送れなければ切断とみなして終わる（再送はしない）
                        if send_envelope(&mut socket, &envelope).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::error!(error = %e, "failed to encode score update"),
                }
            }
            // 2. クライアントからのメッセージ
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = dispatch(&state, &game_id, text.as_str());
                        if send_envelope(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Ping/Pong は axum が処理する。Binary は使わない
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::debug!(game_id = %game_id, "websocket disconnected");
}

/// 受信したテキストを解釈して返信を作る
pub fn dispatch(state: &AppState, game_id: &str, text: &str) -> ServerEnvelope {
    let envelope: ClientEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(game_id, error = %e, "malformed websocket message");
            return ServerEnvelope::error("Invalid message format");
        }
    };

    match envelope.kind {
        ClientMessageType::Ping => ServerEnvelope::pong(),
        ClientMessageType::ChatMessage => {
            let request: ChatMessageRequest = match envelope.decode_payload() {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!(game_id, error = %e, "malformed chat payload");
                    return ServerEnvelope::error("Invalid message format");
                }
            };
            let message = state
                .service
                .post_chat(game_id, &request.message, &request.user_id);
            ServerEnvelope::chat_message(&message)
                .unwrap_or_else(|_| ServerEnvelope::error("Failed to encode chat message"))
        }
    }
}

async fn send_envelope(socket: &mut WebSocket, envelope: &ServerEnvelope) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(envelope) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode websocket envelope");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}
