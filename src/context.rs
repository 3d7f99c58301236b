use std::sync::Arc;

use crate::api::AppState;
use crate::bus::UpdateBus;
use crate::config::{AppConfig, SimulationSettings};
use crate::error::GatewayError;
use crate::gateway::{FootballDataClient, MatchGateway};
use crate::repository::MatchRepository;
use crate::seed::{self, SeedSummary};
use crate::service::GameService;
use crate::simulation::Simulator;

/// アプリケーション全体の状態
///
/// 起動時に1つ作り、各コンポーネントに明示的に渡す。
/// 終了時は `shutdown` でシミュレーションタスクをすべて止める。
pub struct AppContext {
    pub repo: Arc<MatchRepository>,
    pub bus: UpdateBus,
    pub simulator: Simulator,
    pub service: Arc<GameService>,
}

impl AppContext {
    /// 空のリポジトリで組み立てる（シードもタスク開始もしない）
    pub fn new(settings: SimulationSettings, gateway: Option<Arc<dyn MatchGateway>>) -> Self {
        let repo = Arc::new(MatchRepository::new());
        let bus = UpdateBus::new();
        let simulator = Simulator::new(Arc::clone(&repo), bus.clone(), settings);
        let service = Arc::new(GameService::new(Arc::clone(&repo), gateway));

        Self {
            repo,
            bus,
            simulator,
            service,
        }
    }

    /// 設定から組み立てる。APIキーがあれば外部APIを有効にする
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let gateway: Option<Arc<dyn MatchGateway>> = match &config.gateway {
            Some(settings) => Some(Arc::new(FootballDataClient::new(settings)?)),
            None => None,
        };
        Ok(Self::new(config.simulation, gateway))
    }

    /// デモデータを投入し、試合中の試合のシミュレーションを開始する
    pub fn bootstrap(&self) -> SeedSummary {
        let summary = {
            let mut rng = rand::rng();
            seed::seed_repository(&self.repo, &mut rng)
        };
        let started = self.simulator.start_all_live();
        tracing::info!(
            live = summary.live,
            upcoming = summary.upcoming,
            simulations = started,
            "seed data loaded"
        );
        summary
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            service: Arc::clone(&self.service),
            bus: self.bus.clone(),
        }
    }

    pub async fn shutdown(&self) {
        self.simulator.shutdown().await;
    }
}
