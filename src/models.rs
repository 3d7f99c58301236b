use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// 試合の基本データ
// =============================================================================

/// 試合のライフサイクル
///
/// - Scheduled: 開始前
/// - Live: 試合中（シミュレーションが状態を進める）
/// - Finished: 終了（以後は不変）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Scheduled,
    Live,
    Finished,
}

/// ホーム / アウェイのどちら側か
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

/// 選手のポジション
///
/// JSONでは "GK" / "DEF" / "MID" / "FWD" の文字列になる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DEF")]
    Defender,
    #[serde(rename = "MID")]
    Midfielder,
    #[serde(rename = "FWD")]
    Forward,
}

impl Position {
    /// 背番号からポジションを決める（シードデータ用）
    pub fn from_squad_number(number: u8) -> Self {
        match number {
            0 | 1 => Position::Goalkeeper,
            2..=4 => Position::Defender,
            5..=8 => Position::Midfielder,
            _ => Position::Forward,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub logo: String,
    pub primary_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub number: u8,
    pub position: Position,
    pub team_id: String,
}

/// 得点イベント
///
/// 一度追加されたら変更しない。試合内では分の昇順に並ぶ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub player_id: String,
    pub player_name: String,
    pub minute: u32,
    pub team_id: String,
    pub is_own_goal: bool,
}

/// 1試合を表す構造体
///
/// # フィールド
/// - status: ライフサイクル（Liveの間だけシミュレーションが書き換える）
/// - home_score / away_score: スコア
/// - goals: 得点イベント（分の昇順）
/// - current_minute: 試合中の経過分（開始前は None）
/// - is_half_time: ちょうど45分のときだけ true
///
/// スコアと goals は独立した射影として扱う。
/// 外部APIから来た試合は goals が空でもスコアを持つことがある。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub home_team: Team,
    pub away_team: Team,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: GameStatus,
    pub home_score: u32,
    pub away_score: u32,
    pub goals: Vec<Goal>,
    pub venue: String,
    pub competition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_minute: Option<u32>,
    #[serde(default)]
    pub is_half_time: bool,
}

impl Game {
    pub fn is_live(&self) -> bool {
        self.status == GameStatus::Live
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// チームIDからどちら側かを判定する
    pub fn side_of(&self, team_id: &str) -> Option<Side> {
        if self.home_team.id == team_id {
            Some(Side::Home)
        } else if self.away_team.id == team_id {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// 現在の可変フィールドからスナップショットを作る
    pub fn live_score(&self) -> LiveScoreUpdate {
        LiveScoreUpdate {
            game_id: self.id.clone(),
            home_score: self.home_score,
            away_score: self.away_score,
            current_minute: self.current_minute.unwrap_or(0),
            goals: self.goals.clone(),
            is_half_time: self.is_half_time,
        }
    }
}

/// スタメンの人数（固定）
pub const STARTING_XI: usize = 11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    pub starting: Vec<Player>,
    pub substitutes: Vec<Player>,
    pub coach: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineup {
    pub home_team: TeamLineup,
    pub away_team: TeamLineup,
}

impl Lineup {
    pub fn side(&self, side: Side) -> &TeamLineup {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub game_id: String,
}

/// Update Bus に流れるスナップショット
///
/// 差分ではなく累積状態なので、途中のティックを取りこぼしても問題ない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveScoreUpdate {
    pub game_id: String,
    pub home_score: u32,
    pub away_score: u32,
    pub current_minute: u32,
    pub goals: Vec<Goal>,
    pub is_half_time: bool,
}

/// POST /chat/{gameId} と WebSocket の chat_message のボディ
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub message: String,
    pub user_id: String,
}

// =============================================================================
// WebSocket エンベロープ
// =============================================================================

/// サーバー → クライアントのメッセージ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMessageType {
    ScoreUpdate,
    ChatMessage,
    Pong,
    Error,
}

/// クライアント → サーバーのメッセージ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMessageType {
    ChatMessage,
    Ping,
}

/// `{type, payload}` 形式。payload は本体をJSON文字列にしたもの。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEnvelope {
    #[serde(rename = "type")]
    pub kind: ServerMessageType,
    pub payload: String,
}

impl ServerEnvelope {
    pub fn score_update(update: &LiveScoreUpdate) -> serde_json::Result<Self> {
        Ok(Self {
            kind: ServerMessageType::ScoreUpdate,
            payload: serde_json::to_string(update)?,
        })
    }

    pub fn chat_message(message: &ChatMessage) -> serde_json::Result<Self> {
        Ok(Self {
            kind: ServerMessageType::ChatMessage,
            payload: serde_json::to_string(message)?,
        })
    }

    pub fn pong() -> Self {
        Self {
            kind: ServerMessageType::Pong,
            payload: String::new(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            kind: ServerMessageType::Error,
            payload: reason.into(),
        }
    }
}

/// クライアントからのエンベロープ
///
/// payload は正式にはJSON文字列だが、オブジェクトをそのまま送ってくる
/// クライアントもいるので `Value` で受けて後から解釈する。
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    #[serde(rename = "type")]
    pub kind: ClientMessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ClientEnvelope {
    /// payload を型付きの本体にデコードする
    pub fn decode_payload<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        match &self.payload {
            serde_json::Value::String(inner) => serde_json::from_str(inner),
            other => serde_json::from_value(other.clone()),
        }
    }
}

// =============================================================================
// 表示用の拡張データ（enhanced-*）
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEventKind {
    Goal,
    Card,
    Substitution,
    Foul,
    Corner,
    FreeKick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MatchEventKind,
    pub minute: u32,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub team_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<CardType>,
    pub is_home_team: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Hls,
    Youtube,
    Rtmp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamQuality {
    #[serde(rename = "sd")]
    Sd,
    #[serde(rename = "hd")]
    Hd,
    #[serde(rename = "4k")]
    Uhd4k,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: StreamKind,
    pub quality: StreamQuality,
    pub language: String,
    pub is_live: bool,
    pub fallback_image: String,
}

/// ピッチ上の座標（x, y は 0〜100 のパーセント）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPosition {
    pub x: f64,
    pub y: f64,
    pub player_id: String,
    #[serde(default)]
    pub is_ball: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    pub possession: f64,
    pub shots: u32,
    pub shots_on_target: u32,
    pub corners: u32,
    pub fouls: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub offsides: u32,
    pub passes: u32,
    pub pass_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedGame {
    #[serde(flatten)]
    pub game: Game,
    pub events: Vec<MatchEvent>,
    pub streams: Vec<StreamInfo>,
    pub home_team_stats: TeamStats,
    pub away_team_stats: TeamStats,
    pub field_positions: Vec<FieldPosition>,
    pub attendance: Option<u32>,
    pub weather: Option<String>,
    pub referee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    #[serde(flatten)]
    pub player: Player,
    pub photo: String,
    pub goals: u32,
    pub assists: u32,
    pub rating: f64,
    pub minutes_played: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub shots: u32,
    pub passes: u32,
    pub pass_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedTeamLineup {
    pub starting: Vec<PlayerStats>,
    pub substitutes: Vec<PlayerStats>,
    pub coach: String,
    pub formation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedLineup {
    pub home_team: EnhancedTeamLineup,
    pub away_team: EnhancedTeamLineup,
}
