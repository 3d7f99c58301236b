// =============================================================================
// REST API
// =============================================================================
//
// ハンドラーは薄く、GameService を呼んで JSON にするだけ。
// - 見つからない: 404（本文はプレーンテキスト）
// - POST /chat: 201 と作成したメッセージ
// - ハンドラー内の panic: CatchPanicLayer で 500（詳細は返さない）
// =============================================================================

use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bus::UpdateBus;
use crate::error::ApiError;
use crate::models::{
    ChatMessage, ChatMessageRequest, EnhancedGame, EnhancedLineup, FieldPosition, Game,
    LiveScoreUpdate, Lineup, MatchEvent, StreamInfo,
};
use crate::service::GameService;
use crate::ws;

/// ハンドラーが持つ共有状態
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<GameService>,
    pub bus: UpdateBus,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// GET /games/live
async fn live_games(State(state): State<AppState>) -> Json<Vec<Game>> {
    Json(state.service.get_live_games().await)
}

/// GET /games/upcoming
async fn upcoming_games(State(state): State<AppState>) -> Json<Vec<Game>> {
    Json(state.service.get_upcoming_games().await)
}

/// GET /game/{id}
async fn game(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Game> {
    state
        .service
        .get_game(&id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Game"))
}

/// GET /lineup/{gameId}
async fn lineup(State(state): State<AppState>, Path(game_id): Path<String>) -> ApiResult<Lineup> {
    state
        .service
        .get_lineup(&game_id)
        .map(Json)
        .ok_or(ApiError::NotFound("Lineup"))
}

/// GET /score/live/{gameId}（試合中でなければ404）
async fn live_score(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<LiveScoreUpdate> {
    state
        .service
        .get_live_score(&game_id)
        .map(Json)
        .ok_or(ApiError::NotFound("Live score"))
}

/// GET /chat/{gameId}（知らないIDなら空配列）
async fn chat_history(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Json<Vec<ChatMessage>> {
    Json(state.service.get_chat(&game_id))
}

/// POST /chat/{gameId}
async fn post_chat(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(payload): Json<ChatMessageRequest>,
) -> (StatusCode, Json<ChatMessage>) {
    let message = state
        .service
        .post_chat(&game_id, &payload.message, &payload.user_id);
    (StatusCode::CREATED, Json(message))
}

/// GET /enhanced-game/{id}
async fn enhanced_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EnhancedGame> {
    state
        .service
        .get_enhanced_game(&id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Game"))
}

/// GET /enhanced-lineup/{gameId}
async fn enhanced_lineup(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<EnhancedLineup> {
    state
        .service
        .get_enhanced_lineup(&game_id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Lineup"))
}

/// GET /events/{gameId}
async fn events(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Vec<MatchEvent>> {
    state
        .service
        .get_enhanced_game(&game_id)
        .await
        .map(|g| Json(g.events))
        .ok_or(ApiError::NotFound("Game"))
}

/// GET /streams/{gameId}
async fn streams(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Vec<StreamInfo>> {
    state
        .service
        .get_enhanced_game(&game_id)
        .await
        .map(|g| Json(g.streams))
        .ok_or(ApiError::NotFound("Game"))
}

/// GET /field-positions/{gameId}
async fn field_positions(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> ApiResult<Vec<FieldPosition>> {
    state
        .service
        .get_enhanced_game(&game_id)
        .await
        .map(|g| Json(g.field_positions))
        .ok_or(ApiError::NotFound("Game"))
}

/// panic を 500 にする（スタックトレースは出さない）
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    tracing::error!(panic = %detail, "handler panicked");

    ApiError::Internal.into_response()
}

/// ルーターを構築
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/games/live", get(live_games))
        .route("/games/upcoming", get(upcoming_games))
        .route("/game/{id}", get(game))
        .route("/lineup/{game_id}", get(lineup))
        .route("/score/live/{game_id}", get(live_score))
        .route("/chat/{game_id}", get(chat_history).post(post_chat))
        .route("/enhanced-game/{id}", get(enhanced_game))
        .route("/enhanced-lineup/{game_id}", get(enhanced_lineup))
        .route("/events/{game_id}", get(events))
        .route("/streams/{game_id}", get(streams))
        .route("/field-positions/{game_id}", get(field_positions))
        .route("/ws/game/{game_id}", get(ws::ws_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
