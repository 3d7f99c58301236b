use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::{ChatMessage, Game, GameStatus, LiveScoreUpdate, Lineup};

/// 試合・ラインナップ・チャットをメモリ上で管理する
///
/// 試合IDをキーにした3つのマップを持つ。永続化はしないので再起動で消える。
///
/// # 書き込みのルール
/// 1つの試合を書き換えるのは、その試合のシミュレーションタスクだけ。
/// 読み手（REST / WebSocket）が途中状態を見ないよう、フィールド単位では
/// 更新せず `put` で値ごと差し替える。
#[derive(Debug, Default)]
pub struct MatchRepository {
    games: RwLock<HashMap<String, Game>>,
    lineups: RwLock<HashMap<String, Lineup>>,
    chats: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl MatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Game> {
        self.games.read().get(id).cloned()
    }

    /// 試合を丸ごと差し替える（なければ追加）
    pub fn put(&self, game: Game) {
        self.games.write().insert(game.id.clone(), game);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.games.read().contains_key(id)
    }

    /// 指定ステータスの試合をID順で返す
    pub fn list_by_status(&self, status: GameStatus) -> Vec<Game> {
        let mut games: Vec<Game> = self
            .games
            .read()
            .values()
            .filter(|g| g.status == status)
            .cloned()
            .collect();
        games.sort_by(|a, b| a.id.cmp(&b.id));
        games
    }

    /// 試合中のときだけスナップショットを返す
    pub fn live_score(&self, id: &str) -> Option<LiveScoreUpdate> {
        self.games
            .read()
            .get(id)
            .filter(|g| g.is_live())
            .map(Game::live_score)
    }

    pub fn put_lineup(&self, game_id: &str, lineup: Lineup) {
        self.lineups.write().insert(game_id.to_string(), lineup);
    }

    pub fn get_lineup(&self, game_id: &str) -> Option<Lineup> {
        self.lineups.read().get(game_id).cloned()
    }

    /// チャット履歴。知らないIDなら空のVec
    pub fn get_chat(&self, game_id: &str) -> Vec<ChatMessage> {
        self.chats.read().get(game_id).cloned().unwrap_or_default()
    }

    /// シードデータ用: 既存の履歴の後ろにそのまま追加する
    pub fn load_chat(&self, game_id: &str, messages: Vec<ChatMessage>) {
        self.chats
            .write()
            .entry(game_id.to_string())
            .or_default()
            .extend(messages);
    }

    /// 新しいメッセージを作って履歴に追加する
    ///
    /// ID・表示名・タイムスタンプはサーバー側で付ける。
    /// 履歴のない試合IDでも新しく作る。
    pub fn append_chat_message(&self, game_id: &str, message: &str, user_id: &str) -> ChatMessage {
        let chat_message = ChatMessage {
            id: format!("msg-{}-{}", game_id, Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            username: format!("User {user_id}"),
            message: message.to_string(),
            timestamp: Utc::now(),
            game_id: game_id.to_string(),
        };

        self.chats
            .write()
            .entry(game_id.to_string())
            .or_default()
            .push(chat_message.clone());

        chat_message
    }
}
