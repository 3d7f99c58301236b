#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use rust_football_live::api;
use rust_football_live::config::SimulationSettings;
use rust_football_live::context::AppContext;
use rust_football_live::gateway::MatchGateway;
use rust_football_live::models::{Game, GameStatus, Team};
use rust_football_live::seed;

pub fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        short_name: name.chars().take(3).collect::<String>().to_uppercase(),
        logo: String::new(),
        primary_color: "#000000".to_string(),
    }
}

/// テスト用の試合（スコア0-0、ゴールなし）
pub fn game(id: &str, status: GameStatus, minute: Option<u32>) -> Game {
    let start_time = Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap();
    Game {
        id: id.to_string(),
        home_team: team("team-1", "Manchester United"),
        away_team: team("team-6", "Tottenham"),
        start_time,
        end_time: start_time + chrono::Duration::minutes(90),
        status,
        home_score: 0,
        away_score: 0,
        goals: Vec::new(),
        venue: "Stadium 1".to_string(),
        competition: "Premier League".to_string(),
        current_minute: minute,
        is_half_time: false,
    }
}

pub fn live_game(id: &str, minute: u32) -> Game {
    game(id, GameStatus::Live, Some(minute))
}

/// 速いティックのシミュレーション設定
pub fn fast_settings(tick_ms: u64, goal_probability: f64) -> SimulationSettings {
    SimulationSettings {
        tick_interval: Duration::from_millis(tick_ms),
        goal_probability,
        seed: Some(7),
    }
}

/// シード済みのコンテキスト（シミュレーションは開始しない）
pub fn seeded_context(gateway: Option<Arc<dyn MatchGateway>>) -> AppContext {
    let context = AppContext::new(SimulationSettings::default(), gateway);
    seed::seed_repository(&context.repo, &mut StdRng::seed_from_u64(42));
    context
}

/// エフェメラルポートでサーバーを起動する
pub async fn spawn_server(context: &AppContext) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::router(context.app_state());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
