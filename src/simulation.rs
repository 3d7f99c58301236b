use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::bus::UpdateBus;
use crate::config::SimulationSettings;
use crate::models::{Game, GameStatus, Goal, Lineup, Position, Side};
use crate::repository::MatchRepository;

pub const HALF_TIME_MINUTE: u32 = 45;
pub const FULL_TIME_MINUTE: u32 = 90;

/// 1ティック処理したあとの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// まだ試合中。次のティックへ
    Continue,
    /// 90分に達して終了した。タスクも終わる
    FullTime,
    /// 試合が見つからない / Live ではない。何もしない
    Inactive,
}

// =============================================================================
// 1分ぶんの進行（純粋関数）
// =============================================================================

/// 試合を1分進めた新しい値を返す
///
/// 1. Live でなければ None（何もしない）
/// 2. 経過分 +1
/// 3. 確率 `goal_probability` でゴール。ホーム / アウェイは半々
/// 4. ハーフタイムはちょうど45分のときだけ
/// 5. 90分以上で Finished
///
/// 元の値は書き換えない。呼び出し側がリポジトリに丸ごと戻す。
pub fn simulate_minute<R: Rng + ?Sized>(
    game: &Game,
    lineup: Option<&Lineup>,
    goal_probability: f64,
    rng: &mut R,
) -> Option<Game> {
    if game.status != GameStatus::Live {
        return None;
    }

    let mut next = game.clone();
    let minute = game.current_minute.unwrap_or(0) + 1;

    // NaN や範囲外の確率ではゴールしない
    if goal_probability > 0.0 && rng.random_bool(goal_probability.min(1.0)) {
        let side = if rng.random_bool(0.5) { Side::Home } else { Side::Away };
        next.goals.push(synthesize_goal(game, lineup, side, minute, rng));
        match side {
            Side::Home => next.home_score += 1,
            Side::Away => next.away_score += 1,
        }
    }

    next.current_minute = Some(minute);
    next.is_half_time = minute == HALF_TIME_MINUTE;
    next.status = if minute >= FULL_TIME_MINUTE {
        GameStatus::Finished
    } else {
        GameStatus::Live
    };

    Some(next)
}

/// 得点者はスタメンのフィールドプレーヤーから選ぶ。
/// ラインナップがなければ背番号9〜19の架空の選手にする。
fn synthesize_goal<R: Rng + ?Sized>(
    game: &Game,
    lineup: Option<&Lineup>,
    side: Side,
    minute: u32,
    rng: &mut R,
) -> Goal {
    let team = game.team(side);

    let outfield: Vec<_> = lineup
        .map(|l| {
            l.side(side)
                .starting
                .iter()
                .filter(|p| p.position != Position::Goalkeeper)
                .collect()
        })
        .unwrap_or_default();

    let (player_id, player_name) = if outfield.is_empty() {
        (
            format!("player-{}-{}", team.id, rng.random_range(9..20)),
            format!("{} Player", team.name),
        )
    } else {
        let scorer = outfield[rng.random_range(0..outfield.len())];
        (scorer.id.clone(), scorer.name.clone())
    };

    Goal {
        id: format!("goal-{}-{}-{}", team.id, minute, &Uuid::new_v4().simple().to_string()[..8]),
        player_id,
        player_name,
        minute,
        team_id: team.id.clone(),
        is_own_goal: false,
    }
}

// =============================================================================
// ティック（リポジトリとバスへの反映）
// =============================================================================

/// 1試合ぶんのティック処理に必要なもの
///
/// タスクごとに clone して持たせる。
#[derive(Debug, Clone)]
pub struct Ticker {
    repo: Arc<MatchRepository>,
    bus: UpdateBus,
    goal_probability: f64,
}

impl Ticker {
    pub fn new(repo: Arc<MatchRepository>, bus: UpdateBus, goal_probability: f64) -> Self {
        Self {
            repo,
            bus,
            goal_probability,
        }
    }

    /// 1分進めて、リポジトリに書き戻し、スナップショットを公開する
    pub fn tick<R: Rng + ?Sized>(&self, game_id: &str, rng: &mut R) -> TickOutcome {
        let Some(game) = self.repo.get(game_id) else {
            return TickOutcome::Inactive;
        };
        let lineup = self.repo.get_lineup(game_id);

        let Some(next) = simulate_minute(&game, lineup.as_ref(), self.goal_probability, rng) else {
            return TickOutcome::Inactive;
        };

        if let Some(goal) = next.goals.get(game.goals.len()) {
            tracing::info!(
                game_id,
                minute = goal.minute,
                team_id = %goal.team_id,
                home = next.home_score,
                away = next.away_score,
                "goal"
            );
        }

        let finished = next.status == GameStatus::Finished;
        let snapshot = next.live_score();
        self.repo.put(next);
        self.bus.publish(snapshot);

        if finished {
            TickOutcome::FullTime
        } else {
            TickOutcome::Continue
        }
    }
}

// =============================================================================
// 試合ごとのタスクを管理するスーパーバイザ
// =============================================================================

/// 実行中タスクの登録簿: 試合ID → (世代, キャンセルトークン)
type Registry = Arc<Mutex<HashMap<String, (u64, CancellationToken)>>>;

/// 試合中の試合ごとに1つずつタスクを動かす
///
/// - 各タスクは独立したタイマーで動き、互いにブロックしない
/// - 1つの試合を進めるのはその試合のタスクだけ
/// - `shutdown` で全タスクをキャンセルし、終了を待つ
pub struct Simulator {
    ticker: Ticker,
    settings: SimulationSettings,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    registry: Registry,
    generation: AtomicU64,
}

impl Simulator {
    pub fn new(repo: Arc<MatchRepository>, bus: UpdateBus, settings: SimulationSettings) -> Self {
        Self {
            ticker: Ticker::new(repo, bus, settings.goal_probability),
            settings,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            registry: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// 試合のシミュレーションを開始する
    ///
    /// Live でない、すでに動いている、シャットダウン済みのいずれかなら false。
    pub fn start(&self, game_id: &str) -> bool {
        if self.shutdown.is_cancelled() || self.tracker.is_closed() {
            return false;
        }
        match self.ticker.repo.get(game_id) {
            Some(game) if game.is_live() => {}
            _ => return false,
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let token = self.shutdown.child_token();
        {
            let mut registry = self.registry.lock();
            if registry.contains_key(game_id) {
                return false;
            }
            registry.insert(game_id.to_string(), (generation, token.clone()));
        }

        // ThreadRng は Send ではないので、タスクには StdRng を持たせる
        let rng = match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(generation)),
            None => StdRng::from_rng(&mut rand::rng()),
        };

        let task = MatchTask {
            game_id: game_id.to_string(),
            generation,
            ticker: self.ticker.clone(),
            period: self.settings.tick_interval,
            token,
            registry: Arc::clone(&self.registry),
            rng,
        };
        self.tracker.spawn(task.run());

        tracing::info!(game_id, "simulation started");
        true
    }

    /// リポジトリにある試合中の試合をすべて開始する
    pub fn start_all_live(&self) -> usize {
        self.ticker
            .repo
            .list_by_status(GameStatus::Live)
            .iter()
            .filter(|g| self.start(&g.id))
            .count()
    }

    /// 1試合だけ止める
    pub fn stop(&self, game_id: &str) -> bool {
        match self.registry.lock().remove(game_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, game_id: &str) -> bool {
        self.registry.lock().contains_key(game_id)
    }

    /// 実行中の試合ID（ソート済み）
    pub fn running(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.registry.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// 全タスクをキャンセルし、すべて終わるまで待つ
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        self.registry.lock().clear();
        tracing::info!("simulation tasks stopped");
    }
}

/// 1試合ぶんのタスク
struct MatchTask {
    game_id: String,
    generation: u64,
    ticker: Ticker,
    period: std::time::Duration,
    token: CancellationToken,
    registry: Registry,
    rng: StdRng,
}

impl MatchTask {
    async fn run(mut self) {
        // 最初のティックは1周期あと
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.token.cancelled() => {
                    tracing::debug!(game_id = %self.game_id, "simulation cancelled");
                    break;
                }
                _ = interval.tick() => {
                    match self.ticker.tick(&self.game_id, &mut self.rng) {
                        TickOutcome::Continue => {}
                        TickOutcome::FullTime => {
                            tracing::info!(game_id = %self.game_id, "full time");
                            break;
                        }
                        TickOutcome::Inactive => break,
                    }
                }
            }
        }

        // 同じ試合が再開されていたら、新しい登録は消さない
        let mut registry = self.registry.lock();
        if registry
            .get(&self.game_id)
            .is_some_and(|(generation, _)| *generation == self.generation)
        {
            registry.remove(&self.game_id);
        }
    }
}
