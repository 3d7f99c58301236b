use std::sync::Arc;

use crate::enrich;
use crate::gateway::MatchGateway;
use crate::models::{
    ChatMessage, EnhancedGame, EnhancedLineup, Game, GameStatus, LiveScoreUpdate, Lineup,
};
use crate::repository::MatchRepository;

/// 読み取り中心のファサード
///
/// 外部API（あれば）とリポジトリを組み合わせてレスポンス用のデータを作る。
/// 外部APIのエラーはここで止め、呼び出し側には決して返さない。
#[derive(Clone)]
pub struct GameService {
    repo: Arc<MatchRepository>,
    gateway: Option<Arc<dyn MatchGateway>>,
}

impl GameService {
    pub fn new(repo: Arc<MatchRepository>, gateway: Option<Arc<dyn MatchGateway>>) -> Self {
        Self { repo, gateway }
    }

    pub fn repository(&self) -> &Arc<MatchRepository> {
        &self.repo
    }

    pub fn has_gateway(&self) -> bool {
        self.gateway.is_some()
    }

    /// 試合中の試合
    ///
    /// 外部APIの結果が空、またはエラーならリポジトリの Live な試合を返す。
    pub async fn get_live_games(&self) -> Vec<Game> {
        if let Some(gateway) = &self.gateway {
            match gateway.live_matches().await {
                Ok(games) if !games.is_empty() => return games,
                Ok(_) => tracing::debug!("provider returned no live matches, using local data"),
                Err(e) => tracing::warn!(error = %e, "provider live matches failed, using local data"),
            }
        }
        self.repo.list_by_status(GameStatus::Live)
    }

    /// 開始前の試合（get_live_games と同じ方針）
    pub async fn get_upcoming_games(&self) -> Vec<Game> {
        if let Some(gateway) = &self.gateway {
            match gateway.upcoming_matches().await {
                Ok(games) if !games.is_empty() => return games,
                Ok(_) => tracing::debug!("provider returned no upcoming matches, using local data"),
                Err(e) => {
                    tracing::warn!(error = %e, "provider upcoming matches failed, using local data")
                }
            }
        }
        self.repo.list_by_status(GameStatus::Scheduled)
    }

    /// IDで1試合。外部API → リポジトリの順に探し、どちらにもなければ None
    pub async fn get_game(&self, id: &str) -> Option<Game> {
        if let Some(gateway) = &self.gateway {
            match gateway.match_by_id(id).await {
                Ok(Some(game)) => return Some(game),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(game_id = id, error = %e, "provider lookup failed, using local data")
                }
            }
        }
        self.repo.get(id)
    }

    pub fn get_lineup(&self, game_id: &str) -> Option<Lineup> {
        self.repo.get_lineup(game_id)
    }

    pub fn get_live_score(&self, game_id: &str) -> Option<LiveScoreUpdate> {
        self.repo.live_score(game_id)
    }

    pub fn get_chat(&self, game_id: &str) -> Vec<ChatMessage> {
        self.repo.get_chat(game_id)
    }

    pub fn post_chat(&self, game_id: &str, message: &str, user_id: &str) -> ChatMessage {
        self.repo.append_chat_message(game_id, message, user_id)
    }

    /// 試合に表示用のイベント・スタッツ・配置などを付けたもの
    pub async fn get_enhanced_game(&self, id: &str) -> Option<EnhancedGame> {
        let game = self.get_game(id).await?;
        let lineup = self.repo.get_lineup(id);
        let mut rng = rand::rng();
        Some(enrich::enhance_game(game, lineup.as_ref(), &mut rng))
    }

    /// ラインナップに選手ごとのスタッツを付けたもの
    pub async fn get_enhanced_lineup(&self, game_id: &str) -> Option<EnhancedLineup> {
        let lineup = self.repo.get_lineup(game_id)?;
        let game = self.get_game(game_id).await?;
        let mut rng = rand::rng();
        Some(enrich::enhance_lineup(&lineup, &game, &mut rng))
    }
}
