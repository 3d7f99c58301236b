// =============================================================================
// 外部データプロバイダ（football-data.org v4）
// =============================================================================
//
// 無料プランでは詳細なライブ情報（得点者・ラインナップ）が取れないので、
// 取れるのは試合の基本情報とスコアだけ。取れない部分はシミュレーションで補う。
//
// 失敗は GatewayError として返し、呼び出し側（GameService）が握りつぶして
// ローカルデータにフォールバックする。
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::GatewaySettings;
use crate::error::GatewayError;
use crate::models::{Game, GameStatus, Team};

/// 試合データを返す外部ソース
///
/// 空のリストも正常な結果。
#[async_trait]
pub trait MatchGateway: Send + Sync {
    /// 進行中（IN_PLAY / PAUSED）の試合
    async fn live_matches(&self) -> Result<Vec<Game>, GatewayError>;

    /// 開始前の試合
    async fn upcoming_matches(&self) -> Result<Vec<Game>, GatewayError>;

    /// IDで1試合。プロバイダが知らなければ Ok(None)
    async fn match_by_id(&self, id: &str) -> Result<Option<Game>, GatewayError>;
}

// --- プロバイダのレスポンス形式 ---

#[derive(Debug, Clone, Deserialize)]
pub struct MatchesResponse {
    #[serde(default)]
    pub matches: Vec<MatchDto>,
}

/// `/matches/{id}` は試合オブジェクトを直接返すが、`match` で包む版もある
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MatchDetailResponse {
    Wrapped {
        #[serde(rename = "match")]
        inner: MatchDto,
    },
    Bare(MatchDto),
}

impl MatchDetailResponse {
    fn into_inner(self) -> MatchDto {
        match self {
            MatchDetailResponse::Wrapped { inner } => inner,
            MatchDetailResponse::Bare(dto) => dto,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub id: i64,
    pub utc_date: String,
    pub status: String,
    pub home_team: TeamDto,
    pub away_team: TeamDto,
    #[serde(default)]
    pub score: ScoreDto,
    pub competition: CompetitionDto,
    #[serde(default)]
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDto {
    #[serde(default)]
    pub full_time: Option<ScoreValueDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreValueDto {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompetitionDto {
    pub name: String,
}

/// プロバイダのステータス文字列を変換する
pub fn map_status(status: &str) -> GameStatus {
    match status {
        "IN_PLAY" | "PAUSED" => GameStatus::Live,
        "FINISHED" => GameStatus::Finished,
        _ => GameStatus::Scheduled,
    }
}

fn is_in_play(status: &str) -> bool {
    matches!(status, "IN_PLAY" | "PAUSED")
}

impl TeamDto {
    fn into_team(self) -> Team {
        // 略称がなければ名前の先頭3文字を大文字で
        let short_name = self
            .short_name
            .unwrap_or_else(|| self.name.chars().take(3).collect::<String>().to_uppercase());
        Team {
            id: self.id.to_string(),
            name: self.name,
            short_name,
            logo: String::new(),
            primary_color: "#222".to_string(),
        }
    }
}

impl TryFrom<MatchDto> for Game {
    type Error = GatewayError;

    fn try_from(dto: MatchDto) -> Result<Self, Self::Error> {
        let start_time = DateTime::parse_from_rfc3339(&dto.utc_date)
            .map_err(|e| GatewayError::Decode {
                id: dto.id,
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);
        let full_time = dto.score.full_time.unwrap_or_default();

        Ok(Game {
            id: dto.id.to_string(),
            home_team: dto.home_team.into_team(),
            away_team: dto.away_team.into_team(),
            start_time,
            // 終了時刻は提供されない
            end_time: start_time,
            status: map_status(&dto.status),
            home_score: full_time.home.unwrap_or(0),
            away_score: full_time.away.unwrap_or(0),
            goals: Vec::new(),
            venue: dto.venue.unwrap_or_default(),
            competition: dto.competition.name,
            current_minute: None,
            is_half_time: false,
        })
    }
}

/// 変換できないレコードは捨てる（1件の不正でリスト全体を失わない）
fn translate_all(matches: Vec<MatchDto>) -> Vec<Game> {
    matches
        .into_iter()
        .filter_map(|dto| match Game::try_from(dto) {
            Ok(game) => Some(game),
            Err(e) => {
                tracing::warn!(error = %e, "skipping provider record");
                None
            }
        })
        .collect()
}

// --- HTTP クライアント ---

/// football-data.org の HTTP クライアント
pub struct FootballDataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FootballDataClient {
    pub fn new(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("X-Auth-Token", &self.api_key)
            .send()
            .await?;
        Ok(response)
    }

    async fn fetch_matches(&self, path: &str) -> Result<Vec<MatchDto>, GatewayError> {
        let response = self.get(path).await?;
        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status()));
        }
        let body: MatchesResponse = response.json().await?;
        Ok(body.matches)
    }
}

#[async_trait]
impl MatchGateway for FootballDataClient {
    async fn live_matches(&self) -> Result<Vec<Game>, GatewayError> {
        let matches = self
            .fetch_matches("/matches")
            .await?
            .into_iter()
            .filter(|m| is_in_play(&m.status))
            .collect();
        Ok(translate_all(matches))
    }

    async fn upcoming_matches(&self) -> Result<Vec<Game>, GatewayError> {
        let matches = self.fetch_matches("/matches?status=SCHEDULED").await?;
        Ok(translate_all(matches))
    }

    async fn match_by_id(&self, id: &str) -> Result<Option<Game>, GatewayError> {
        let response = self.get(&format!("/matches/{id}")).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if !status.is_success() => Err(GatewayError::Status(status)),
            _ => {
                let body: MatchDetailResponse = response.json().await?;
                Game::try_from(body.into_inner()).map(Some)
            }
        }
    }
}
