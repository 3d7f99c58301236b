mod common;

use rand::SeedableRng;
use rand::rngs::StdRng;

use rust_football_live::models::{GameStatus, Position, STARTING_XI};
use rust_football_live::repository::MatchRepository;
use rust_football_live::seed::{self, LIVE_GAMES, SUBSTITUTES, UPCOMING_GAMES};

use common::{game, live_game};

#[test]
fn test_put_replaces_whole_game() {
    let repo = MatchRepository::new();
    repo.put(live_game("g1", 10));
    assert!(repo.contains("g1"));

    let mut updated = live_game("g1", 11);
    updated.home_score = 2;
    repo.put(updated.clone());

    assert_eq!(repo.get("g1"), Some(updated));
    assert!(repo.get("missing").is_none());
}

#[test]
fn test_list_by_status_sorted() {
    let repo = MatchRepository::new();
    repo.put(live_game("b", 10));
    repo.put(live_game("a", 20));
    repo.put(game("c", GameStatus::Scheduled, None));
    repo.put(game("d", GameStatus::Finished, Some(90)));

    let live: Vec<String> = repo
        .list_by_status(GameStatus::Live)
        .into_iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(live, vec!["a", "b"]);
    assert_eq!(repo.list_by_status(GameStatus::Scheduled).len(), 1);
    assert_eq!(repo.list_by_status(GameStatus::Finished).len(), 1);
}

#[test]
fn test_live_score_only_for_live_games() {
    let repo = MatchRepository::new();
    let mut live = live_game("live", 45);
    live.is_half_time = true;
    live.away_score = 1;
    repo.put(live);
    repo.put(game("sched", GameStatus::Scheduled, None));

    let score = repo.live_score("live").unwrap();
    assert_eq!(score.game_id, "live");
    assert_eq!(score.current_minute, 45);
    assert_eq!(score.away_score, 1);
    assert!(score.is_half_time);

    assert!(repo.live_score("sched").is_none());
    assert!(repo.live_score("missing").is_none());
}

#[test]
fn test_unknown_chat_is_empty() {
    let repo = MatchRepository::new();
    assert!(repo.get_chat("nope").is_empty());
}

#[test]
fn test_append_chat_message() {
    let repo = MatchRepository::new();

    // 1. 履歴のない試合にも投稿できる
    let first = repo.append_chat_message("g1", "Come on!", "42");
    assert_eq!(first.username, "User 42");
    assert_eq!(first.user_id, "42");
    assert_eq!(first.game_id, "g1");
    assert!(first.id.starts_with("msg-g1-"));

    // 2. 追加順に並ぶ
    let second = repo.append_chat_message("g1", "What a save", "7");
    let chat = repo.get_chat("g1");
    assert_eq!(chat, vec![first.clone(), second.clone()]);
    assert_ne!(first.id, second.id);
    assert!(first.timestamp <= second.timestamp);

    // 3. 他の試合には影響しない
    assert!(repo.get_chat("g2").is_empty());
}

#[test]
fn test_lineup_storage() {
    let repo = MatchRepository::new();
    let g = live_game("g1", 10);
    let lineup = seed::lineup_for(&g.home_team, &g.away_team);

    assert!(repo.get_lineup("g1").is_none());
    repo.put_lineup("g1", lineup.clone());
    assert_eq!(repo.get_lineup("g1"), Some(lineup));
}

// =============================================================================
// シードデータ
// =============================================================================

#[test]
fn test_seed_repository() {
    let repo = MatchRepository::new();
    let summary = seed::seed_repository(&repo, &mut StdRng::seed_from_u64(11));
    assert_eq!(summary.live, LIVE_GAMES);
    assert_eq!(summary.upcoming, UPCOMING_GAMES);

    let live = repo.list_by_status(GameStatus::Live);
    assert_eq!(live.len(), LIVE_GAMES);
    for g in &live {
        let minute = g.current_minute.unwrap();
        assert!((15..75).contains(&minute));
        assert_ne!(g.home_team.id, g.away_team.id);

        // スコアはゴール数と一致する
        let home = g.goals.iter().filter(|x| x.team_id == g.home_team.id).count() as u32;
        let away = g.goals.iter().filter(|x| x.team_id == g.away_team.id).count() as u32;
        assert_eq!((g.home_score, g.away_score), (home, away));
        assert!(g.goals.iter().all(|x| x.minute <= minute));

        assert_eq!(repo.get_chat(&g.id).len(), 10);
    }

    let upcoming = repo.list_by_status(GameStatus::Scheduled);
    assert_eq!(upcoming.len(), UPCOMING_GAMES);
    for g in &upcoming {
        assert!(g.current_minute.is_none());
        assert!(g.goals.is_empty());
        assert!(repo.get_chat(&g.id).is_empty());
    }

    assert!(repo.get("live-game-1").is_some());
    assert!(repo.get("upcoming-game-5").is_some());
}

#[test]
fn test_seed_lineups() {
    let repo = MatchRepository::new();
    seed::seed_repository(&repo, &mut StdRng::seed_from_u64(12));

    let lineup = repo.get_lineup("live-game-1").unwrap();
    for team in [&lineup.home_team, &lineup.away_team] {
        assert_eq!(team.starting.len(), STARTING_XI);
        assert_eq!(team.substitutes.len(), SUBSTITUTES);
        assert_eq!(team.starting[0].position, Position::Goalkeeper);
        assert_eq!(
            team.starting
                .iter()
                .filter(|p| p.position == Position::Goalkeeper)
                .count(),
            1
        );
        assert!(team.coach.starts_with("Coach "));
    }
}

#[test]
fn test_squad_positions_follow_numbers() {
    let teams = seed::teams();
    assert_eq!(teams.len(), 10);

    let squad = seed::squad(&teams[0]);
    assert_eq!(squad.len(), 20);
    assert_eq!(squad[0].position, Position::Goalkeeper);
    assert_eq!(squad[1].position, Position::Defender);
    assert_eq!(squad[4].position, Position::Midfielder);
    assert_eq!(squad[8].position, Position::Forward);
    assert_eq!(squad[19].position, Position::Forward);
}
