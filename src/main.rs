// =============================================================================
// サッカー試合ライブ配信サーバー
// =============================================================================
//
// 試合の状態をメモリ上でシミュレートし、REST と WebSocket で配信する。
//
// 【アーキテクチャの概要】
// ┌──────────────┐  put   ┌──────────────┐
// │ Simulator    │──────▶│ Repository   │◀──── REST (GameService)
// │ (試合ごと)    │        └──────────────┘
// │              │ publish ┌──────────────┐
// │              │───────▶│ UpdateBus    │────▶ WebSocket セッション
// └──────────────┘         │ (watch)      │
//                          └──────────────┘
//
// モジュール:
// - models: データ型 (Game, Goal, Lineup, ChatMessage ...)
// - repository: 試合・ラインナップ・チャットのインメモリストア
// - simulation: 試合ごとのシミュレーションタスク
// - bus: 最新スコアの配信
// - gateway: 外部データAPI（任意）
// - service / api / ws: 読み取りファサードと通信層
// =============================================================================

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use rust_football_live::api;
use rust_football_live::config::AppConfig;
use rust_football_live::context::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env があれば読む（なくてもよい）
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // =========================================================================
    // Step 1: 設定を読み込む
    // =========================================================================
    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        bind = %config.bind_addr,
        gateway = config.gateway.is_some(),
        tick_ms = config.simulation.tick_interval.as_millis() as u64,
        goal_probability = config.simulation.goal_probability,
        "configuration loaded"
    );
    if config.gateway.is_none() {
        tracing::info!("FOOTBALL_DATA_API_KEY not set, serving simulated data only");
    }

    // =========================================================================
    // Step 2: コンテキストを作り、シードとシミュレーションを開始
    // =========================================================================
    let context = AppContext::from_config(&config).context("failed to build provider client")?;
    context.bootstrap();

    // =========================================================================
    // Step 3: Webサーバーを起動
    // =========================================================================
    let app = api::router(context.app_state());
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "server listening");

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .context("server error")?;

    // =========================================================================
    // Step 4: シミュレーションタスクを止める
    // =========================================================================
    context.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}

/// Ctrl+C / SIGTERM を待ってトークンをキャンセルする
async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }

    shutdown.cancel();
}
