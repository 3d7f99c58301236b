// =============================================================================
// 表示用データの合成
// =============================================================================
//
// 試合の中身（スコア・ゴール）は変えず、画面に出す付加情報だけを作る。
// 形は毎回同じで、値だけがランダム。状態として保存はしない。
// =============================================================================

use chrono::Duration;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::models::{
    CardType, EnhancedGame, EnhancedLineup, EnhancedTeamLineup, FieldPosition, Game, GameStatus,
    Lineup, MatchEvent, MatchEventKind, Player, PlayerStats, Position, Side, StreamInfo,
    StreamKind, StreamQuality, TeamLineup, TeamStats,
};

pub const FORMATION: &str = "4-4-2";

const REFEREES: [&str; 4] = [
    "Michael Oliver",
    "Anthony Taylor",
    "Felix Brych",
    "Clément Turpin",
];
const WEATHER: [&str; 4] = ["Sunny", "Cloudy", "Light rain", "Clear night"];

/// 表示上の経過分（開始前は0、終了後は90）
fn elapsed_minutes(game: &Game) -> u32 {
    match game.status {
        GameStatus::Scheduled => 0,
        GameStatus::Live => game.current_minute.unwrap_or(0),
        GameStatus::Finished => game.current_minute.unwrap_or(90).max(90),
    }
}

/// ゴールと合成イベントからなる試合イベント一覧（分の昇順）
pub fn match_events<R: Rng + ?Sized>(
    game: &Game,
    lineup: Option<&Lineup>,
    rng: &mut R,
) -> Vec<MatchEvent> {
    let kickoff = game.start_time;
    let mut events: Vec<MatchEvent> = game
        .goals
        .iter()
        .map(|goal| {
            let is_home_team = game.side_of(&goal.team_id) == Some(Side::Home);
            MatchEvent {
                id: format!("event-{}", goal.id),
                kind: MatchEventKind::Goal,
                minute: goal.minute,
                player_id: Some(goal.player_id.clone()),
                player_name: Some(goal.player_name.clone()),
                team_id: goal.team_id.clone(),
                description: if goal.is_own_goal {
                    format!("Own goal by {}", goal.player_name)
                } else {
                    format!("Goal! {} scores", goal.player_name)
                },
                card_type: None,
                is_home_team,
                timestamp: kickoff + Duration::minutes(i64::from(goal.minute)),
            }
        })
        .collect();

    let elapsed = elapsed_minutes(game);
    if elapsed > 1 {
        let extra = rng.random_range(2..=(2 + elapsed / 10));
        for n in 0..extra {
            let side = if rng.random_bool(0.5) { Side::Home } else { Side::Away };
            let team = game.team(side);
            let minute = rng.random_range(1..=elapsed);
            let player = lineup.and_then(|l| l.side(side).starting.choose(rng));

            let (kind, card_type, description) = match rng.random_range(0..5) {
                0 => {
                    let card = if rng.random_bool(0.1) { CardType::Red } else { CardType::Yellow };
                    let label = match card {
                        CardType::Yellow => "Yellow card",
                        CardType::Red => "Red card",
                    };
                    (MatchEventKind::Card, Some(card), format!("{label} for {}", team.name))
                }
                1 => (
                    MatchEventKind::Substitution,
                    None,
                    format!("Substitution for {}", team.name),
                ),
                2 => (MatchEventKind::Foul, None, format!("Foul by {}", team.name)),
                3 => (MatchEventKind::Corner, None, format!("Corner for {}", team.name)),
                _ => (
                    MatchEventKind::FreeKick,
                    None,
                    format!("Free kick for {}", team.name),
                ),
            };

            events.push(MatchEvent {
                id: format!("event-{}-{}", game.id, n),
                kind,
                minute,
                player_id: player.map(|p| p.id.clone()),
                player_name: player.map(|p| p.name.clone()),
                team_id: team.id.clone(),
                description,
                card_type,
                is_home_team: side == Side::Home,
                timestamp: kickoff + Duration::minutes(i64::from(minute)),
            });
        }
    }

    events.sort_by_key(|e| e.minute);
    events
}

pub fn streams(game: &Game) -> Vec<StreamInfo> {
    let is_live = game.status == GameStatus::Live;
    vec![
        StreamInfo {
            id: format!("stream-{}-main", game.id),
            url: format!("https://streams.example.com/{}/master.m3u8", game.id),
            kind: StreamKind::Hls,
            quality: StreamQuality::Hd,
            language: "en".to_string(),
            is_live,
            fallback_image: format!("https://streams.example.com/{}/poster.jpg", game.id),
        },
        StreamInfo {
            id: format!("stream-{}-backup", game.id),
            url: format!("https://www.youtube.com/embed/live_stream?channel={}", game.id),
            kind: StreamKind::Youtube,
            quality: StreamQuality::Sd,
            language: "en".to_string(),
            is_live,
            fallback_image: format!("https://streams.example.com/{}/poster.jpg", game.id),
        },
    ]
}

/// 両チームのスタッツ。ボール支配率の合計は100
pub fn team_stats<R: Rng + ?Sized>(
    game: &Game,
    events: &[MatchEvent],
    rng: &mut R,
) -> (TeamStats, TeamStats) {
    let elapsed = elapsed_minutes(game);
    if elapsed == 0 {
        let even = TeamStats {
            possession: 50.0,
            ..TeamStats::default()
        };
        return (even.clone(), even);
    }

    let home_possession = f64::from(rng.random_range(35..=65u32));
    let scale = f64::from(elapsed) / 90.0;

    let mut build = |side: Side, possession: f64| {
        let of_side = |kind: MatchEventKind| {
            events
                .iter()
                .filter(|e| e.kind == kind && e.is_home_team == (side == Side::Home))
                .count() as u32
        };
        let cards = |card: CardType| {
            events
                .iter()
                .filter(|e| e.card_type == Some(card) && e.is_home_team == (side == Side::Home))
                .count() as u32
        };
        let goals = of_side(MatchEventKind::Goal);
        let shots_on_target = goals + (f64::from(rng.random_range(1..=6u32)) * scale).round() as u32;
        let shots = shots_on_target + (f64::from(rng.random_range(2..=10u32)) * scale).round() as u32;

        TeamStats {
            possession,
            shots,
            shots_on_target,
            corners: of_side(MatchEventKind::Corner),
            fouls: of_side(MatchEventKind::Foul),
            yellow_cards: cards(CardType::Yellow),
            red_cards: cards(CardType::Red),
            offsides: (f64::from(rng.random_range(0..=4u32)) * scale).round() as u32,
            passes: (possession * 10.0 * scale).round() as u32,
            pass_accuracy: f64::from(rng.random_range(70..=92u32)),
        }
    };

    let home = build(Side::Home, home_possession);
    let away = build(Side::Away, 100.0 - home_possession);
    (home, away)
}

/// 4-4-2 の基本配置（ホームが左半分。x は奥行き、y は横幅）
fn base_position(position: Position, index_in_line: usize, line_size: usize) -> (f64, f64) {
    let depth = match position {
        Position::Goalkeeper => 5.0,
        Position::Defender => 18.0,
        Position::Midfielder => 32.0,
        Position::Forward => 44.0,
    };
    let spacing = 100.0 / (line_size as f64 + 1.0);
    (depth, spacing * (index_in_line as f64 + 1.0))
}

/// スタメン22人とボールの位置
pub fn field_positions<R: Rng + ?Sized>(
    lineup: Option<&Lineup>,
    rng: &mut R,
) -> Vec<FieldPosition> {
    let Some(lineup) = lineup else {
        return Vec::new();
    };

    let mut positions = Vec::new();
    for side in [Side::Home, Side::Away] {
        let starting = &lineup.side(side).starting;
        for line in [
            Position::Goalkeeper,
            Position::Defender,
            Position::Midfielder,
            Position::Forward,
        ] {
            let in_line: Vec<&Player> = starting.iter().filter(|p| p.position == line).collect();
            for (i, player) in in_line.iter().enumerate() {
                let (depth, width) = base_position(line, i, in_line.len());
                let x = match side {
                    Side::Home => depth,
                    Side::Away => 100.0 - depth,
                };
                positions.push(FieldPosition {
                    x: (x + rng.random_range(-3.0..3.0)).clamp(0.0, 100.0),
                    y: (width + rng.random_range(-3.0..3.0)).clamp(0.0, 100.0),
                    player_id: player.id.clone(),
                    is_ball: false,
                });
            }
        }
    }

    positions.push(FieldPosition {
        x: rng.random_range(20.0..80.0),
        y: rng.random_range(10.0..90.0),
        player_id: "ball".to_string(),
        is_ball: true,
    });
    positions
}

/// 試合に表示用の付加情報を付ける
pub fn enhance_game<R: Rng + ?Sized>(
    game: Game,
    lineup: Option<&Lineup>,
    rng: &mut R,
) -> EnhancedGame {
    let events = match_events(&game, lineup, rng);
    let (home_team_stats, away_team_stats) = team_stats(&game, &events, rng);
    let field_positions = field_positions(lineup, rng);
    let streams = streams(&game);
    let started = game.status != GameStatus::Scheduled;

    EnhancedGame {
        attendance: started.then(|| rng.random_range(25_000..75_000)),
        weather: WEATHER.choose(rng).map(|w| (*w).to_string()),
        referee: REFEREES.choose(rng).map(|r| (*r).to_string()),
        events,
        streams,
        home_team_stats,
        away_team_stats,
        field_positions,
        game,
    }
}

fn player_stats<R: Rng + ?Sized>(
    player: &Player,
    game: &Game,
    minutes_played: u32,
    rng: &mut R,
) -> PlayerStats {
    let goals = game
        .goals
        .iter()
        .filter(|g| g.player_id == player.id && !g.is_own_goal)
        .count() as u32;
    let played = minutes_played > 0;
    let outfield = player.position != Position::Goalkeeper;

    PlayerStats {
        player: player.clone(),
        photo: format!("https://example.com/players/{}.png", player.id),
        goals,
        assists: if played && outfield && rng.random_bool(0.1) { 1 } else { 0 },
        rating: if played {
            (rng.random_range(6.0..8.5f64) + f64::from(goals) * 0.5).min(10.0)
        } else {
            0.0
        },
        minutes_played,
        yellow_cards: if played && rng.random_bool(0.08) { 1 } else { 0 },
        red_cards: 0,
        shots: if played && outfield { goals + rng.random_range(0..4) } else { 0 },
        passes: if played { rng.random_range(5..=(10 + minutes_played / 2)) } else { 0 },
        pass_accuracy: if played { f64::from(rng.random_range(65..=95u32)) } else { 0.0 },
    }
}

fn enhance_team<R: Rng + ?Sized>(
    team: &TeamLineup,
    game: &Game,
    rng: &mut R,
) -> EnhancedTeamLineup {
    let elapsed = elapsed_minutes(game);
    EnhancedTeamLineup {
        starting: team
            .starting
            .iter()
            .map(|p| player_stats(p, game, elapsed, rng))
            .collect(),
        substitutes: team
            .substitutes
            .iter()
            .map(|p| player_stats(p, game, 0, rng))
            .collect(),
        coach: team.coach.clone(),
        formation: FORMATION.to_string(),
    }
}

/// ラインナップに選手ごとのスタッツを付ける
pub fn enhance_lineup<R: Rng + ?Sized>(
    lineup: &Lineup,
    game: &Game,
    rng: &mut R,
) -> EnhancedLineup {
    EnhancedLineup {
        home_team: enhance_team(&lineup.home_team, game, rng),
        away_team: enhance_team(&lineup.away_team, game, rng),
    }
}
