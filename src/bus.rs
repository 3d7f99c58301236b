use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;

use crate::models::LiveScoreUpdate;

/// 1試合分の最新スナップショットと、その試合で何回目の公開か
#[derive(Debug, Clone)]
struct Published {
    revision: u64,
    update: LiveScoreUpdate,
}

type Snapshots = HashMap<String, Published>;

/// 試合ごとの最新スコアを配信するバス
///
/// キューではなく「試合ID → 最新スナップショット」のマップを1つ持つ。
/// `tokio::sync::watch` なので購読者が遅くても溜まらず、最後に書かれた値だけが見える。
///
/// 書き手は各試合のシミュレーションタスク（試合ごとに1つ）なので、
/// 同じキーに同時に書く者はいない。
#[derive(Debug, Clone)]
pub struct UpdateBus {
    tx: Arc<watch::Sender<Snapshots>>,
}

impl Default for UpdateBus {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateBus {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshots::new());
        Self { tx: Arc::new(tx) }
    }

    /// 試合の最新値を上書きし、全購読者に通知する
    pub fn publish(&self, update: LiveScoreUpdate) {
        self.tx.send_modify(|snapshots| {
            let revision = snapshots
                .get(&update.game_id)
                .map_or(1, |p| p.revision + 1);
            snapshots.insert(update.game_id.clone(), Published { revision, update });
        });
    }

    /// 現在の値（なければ None）
    pub fn latest(&self, game_id: &str) -> Option<LiveScoreUpdate> {
        self.tx.borrow().get(game_id).map(|p| p.update.clone())
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 1試合分だけを取り出す購読を作る
    pub fn subscribe(&self, game_id: impl Into<String>) -> MatchSubscription {
        MatchSubscription {
            game_id: game_id.into(),
            rx: self.tx.subscribe(),
            seen_revision: 0,
        }
    }
}

/// 1試合ぶんの購読
///
/// バス全体の変更通知を受け、自分の試合のエントリが進んだときだけ値を返す。
/// 他の試合の更新は読み飛ばす。
#[derive(Debug)]
pub struct MatchSubscription {
    game_id: String,
    rx: watch::Receiver<Snapshots>,
    seen_revision: u64,
}

impl MatchSubscription {
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// 次の（まだ見ていない）スナップショットを待つ
    ///
    /// すでに公開済みの値があれば最初の呼び出しですぐ返る。
    /// 複数のティックがまとめて1回に見えることはあるが、古い値が新しい値の
    /// あとに見えることはない。バスが破棄されたら None。
    ///
    /// await するのは `changed()` だけなので `tokio::select!` で使っても安全。
    pub async fn next(&mut self) -> Option<LiveScoreUpdate> {
        loop {
            {
                let snapshots = self.rx.borrow_and_update();
                if let Some(published) = snapshots.get(&self.game_id) {
                    if published.revision > self.seen_revision {
                        self.seen_revision = published.revision;
                        return Some(published.update.clone());
                    }
                }
            }

            if self.rx.changed().await.is_err() {
                return None;
            }
        }
    }
}
