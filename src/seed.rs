// =============================================================================
// 起動時のシードデータ
// =============================================================================
//
// 外部APIが使えない（または空の）ときに表示するデモ用データ。
// - クラブ10チーム、各20人の選手
// - 試合中5試合（15〜74分から再開）と開始前5試合
// - 各試合のラインナップ、試合中の試合にはチャット10件
// =============================================================================

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::models::{
    ChatMessage, Game, GameStatus, Goal, Lineup, Player, Position, STARTING_XI, Team, TeamLineup,
};
use crate::repository::MatchRepository;

pub const SQUAD_SIZE: u8 = 20;
pub const SUBSTITUTES: usize = 7;
pub const LIVE_GAMES: usize = 5;
pub const UPCOMING_GAMES: usize = 5;

const CLUBS: [(&str, &str, &str); 10] = [
    ("Manchester United", "MUN", "#DA291C"),
    ("Liverpool", "LIV", "#C8102E"),
    ("Arsenal", "ARS", "#EF0107"),
    ("Chelsea", "CHE", "#034694"),
    ("Manchester City", "MCI", "#6CABDD"),
    ("Tottenham", "TOT", "#132257"),
    ("Barcelona", "BAR", "#A50044"),
    ("Real Madrid", "RMA", "#FFFFFF"),
    ("Bayern Munich", "BAY", "#DC052D"),
    ("PSG", "PSG", "#004170"),
];

const CHAT_USERNAMES: [&str; 5] = [
    "FootballFan",
    "SoccerLover",
    "MatchWatcher",
    "GoalHunter",
    "TeamSupporter",
];

/// 投入したデータの件数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub live: usize,
    pub upcoming: usize,
}

pub fn teams() -> Vec<Team> {
    CLUBS
        .iter()
        .enumerate()
        .map(|(i, (name, short, color))| Team {
            id: format!("team-{}", i + 1),
            name: (*name).to_string(),
            short_name: (*short).to_string(),
            logo: format!("https://example.com/{}.png", short.to_lowercase()),
            primary_color: (*color).to_string(),
        })
        .collect()
}

/// 背番号1〜20の選手を作る
pub fn squad(team: &Team) -> Vec<Player> {
    (1..=SQUAD_SIZE)
        .map(|number| Player {
            id: format!("player-{}-{}", team.id, number),
            name: format!("Player {number}"),
            number,
            position: Position::from_squad_number(number),
            team_id: team.id.clone(),
        })
        .collect()
}

/// スタメン = 先頭11人、控え = 次の7人
pub fn lineup_for(home: &Team, away: &Team) -> Lineup {
    let team_lineup = |team: &Team| {
        let players = squad(team);
        TeamLineup {
            starting: players.iter().take(STARTING_XI).cloned().collect(),
            substitutes: players
                .iter()
                .skip(STARTING_XI)
                .take(SUBSTITUTES)
                .cloned()
                .collect(),
            coach: format!("Coach {}", team.name),
        }
    };

    Lineup {
        home_team: team_lineup(home),
        away_team: team_lineup(away),
    }
}

/// 前半のランダムなゴールを作る（分の昇順）
///
/// スコアはこのゴール数から数える。
fn random_goals<R: Rng + ?Sized>(rng: &mut R, home: &Team, away: &Team, up_to: u32) -> Vec<Goal> {
    let mut goals = Vec::new();
    let last_minute = up_to.clamp(2, 45);

    for (team, label) in [(home, "Home"), (away, "Away")] {
        let count = rng.random_range(0..3);
        for i in 0..count {
            goals.push(Goal {
                id: format!("goal-{}-{}", team.id, i),
                player_id: format!("player-{}-{}", team.id, rng.random_range(9..20)),
                player_name: format!("{} Player {}", label, i + 1),
                minute: rng.random_range(1..last_minute),
                team_id: team.id.clone(),
                is_own_goal: false,
            });
        }
    }

    goals.sort_by_key(|g| g.minute);
    goals
}

fn seed_chat<R: Rng + ?Sized>(rng: &mut R, game_id: &str, now: DateTime<Utc>) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = (1..=10)
        .map(|i| ChatMessage {
            id: format!("msg-{game_id}-{i}"),
            user_id: format!("user-{i}"),
            username: CHAT_USERNAMES[i % CHAT_USERNAMES.len()].to_string(),
            message: format!(
                "Great match so far! {}",
                if i % 2 == 0 { "Come on!" } else { "Amazing play!" }
            ),
            timestamp: now - Duration::minutes(rng.random_range(1..30)),
            game_id: game_id.to_string(),
        })
        .collect();
    messages.sort_by_key(|m| m.timestamp);
    messages
}

/// リポジトリにデモデータを投入する
///
/// 試合中の試合はこのあと Simulator::start で動かす。
pub fn seed_repository<R: Rng + ?Sized>(repo: &MatchRepository, rng: &mut R) -> SeedSummary {
    let teams = teams();
    let now = Utc::now();

    for i in 0..LIVE_GAMES {
        let home = &teams[i];
        let away = &teams[i + LIVE_GAMES];
        let game_id = format!("live-game-{}", i + 1);
        let start_time = now - Duration::minutes(rng.random_range(30..90));
        let current_minute = rng.random_range(15..75);
        let goals = random_goals(rng, home, away, current_minute);

        let game = Game {
            id: game_id.clone(),
            home_team: home.clone(),
            away_team: away.clone(),
            start_time,
            end_time: start_time + Duration::minutes(90),
            status: GameStatus::Live,
            home_score: goals.iter().filter(|g| g.team_id == home.id).count() as u32,
            away_score: goals.iter().filter(|g| g.team_id == away.id).count() as u32,
            goals,
            venue: format!("Stadium {}", i + 1),
            competition: "Premier League".to_string(),
            current_minute: Some(current_minute),
            is_half_time: current_minute == 45,
        };

        repo.put(game);
        repo.put_lineup(&game_id, lineup_for(home, away));
        repo.load_chat(&game_id, seed_chat(rng, &game_id, now));
    }

    for i in 1..=UPCOMING_GAMES {
        let home = &teams[(i + 2) % teams.len()];
        let away = &teams[(i + 7) % teams.len()];
        let game_id = format!("upcoming-game-{i}");
        let start_time = now + Duration::hours(rng.random_range(1..24));

        let game = Game {
            id: game_id.clone(),
            home_team: home.clone(),
            away_team: away.clone(),
            start_time,
            end_time: start_time + Duration::minutes(90),
            status: GameStatus::Scheduled,
            home_score: 0,
            away_score: 0,
            goals: Vec::new(),
            venue: format!("Stadium {}", i + LIVE_GAMES),
            competition: "Champions League".to_string(),
            current_minute: None,
            is_half_time: false,
        };

        repo.put(game);
        repo.put_lineup(&game_id, lineup_for(home, away));
    }

    SeedSummary {
        live: LIVE_GAMES,
        upcoming: UPCOMING_GAMES,
    }
}
