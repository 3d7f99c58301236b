use std::time::Duration;

use rust_football_live::bus::UpdateBus;
use rust_football_live::models::LiveScoreUpdate;

fn update(game_id: &str, minute: u32, home: u32, away: u32) -> LiveScoreUpdate {
    LiveScoreUpdate {
        game_id: game_id.to_string(),
        home_score: home,
        away_score: away,
        current_minute: minute,
        goals: Vec::new(),
        is_half_time: minute == 45,
    }
}

#[tokio::test]
async fn test_late_subscriber_sees_latest_value() {
    let bus = UpdateBus::new();
    bus.publish(update("g1", 10, 0, 0));
    bus.publish(update("g1", 11, 1, 0));

    // 購読前に公開された値も最初の next ですぐ取れる
    let mut sub = bus.subscribe("g1");
    let got = tokio::time::timeout(Duration::from_millis(100), sub.next())
        .await
        .expect("latest value should be immediate")
        .unwrap();
    assert_eq!(got, update("g1", 11, 1, 0));
}

#[tokio::test]
async fn test_other_matches_are_ignored() {
    let bus = UpdateBus::new();
    let mut sub = bus.subscribe("g1");
    assert_eq!(sub.game_id(), "g1");

    bus.publish(update("g2", 30, 2, 2));
    assert!(
        tokio::time::timeout(Duration::from_millis(50), sub.next())
            .await
            .is_err(),
        "update for another match must not be delivered"
    );

    bus.publish(update("g1", 5, 0, 1));
    let got = sub.next().await.unwrap();
    assert_eq!(got.game_id, "g1");
    assert_eq!(got.away_score, 1);
}

#[tokio::test]
async fn test_slow_subscriber_coalesces_to_latest() {
    let bus = UpdateBus::new();
    let mut sub = bus.subscribe("g1");

    for minute in 1..=5 {
        bus.publish(update("g1", minute, 0, 0));
    }

    // 途中の値は飛ばして最後の値だけ
    let got = sub.next().await.unwrap();
    assert_eq!(got.current_minute, 5);

    // 同じ値は二度返さない
    assert!(
        tokio::time::timeout(Duration::from_millis(50), sub.next())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_same_value_published_twice_is_delivered_twice() {
    let bus = UpdateBus::new();
    let mut sub = bus.subscribe("g1");

    bus.publish(update("g1", 90, 1, 1));
    assert_eq!(sub.next().await.unwrap().current_minute, 90);

    bus.publish(update("g1", 90, 1, 1));
    let again = tokio::time::timeout(Duration::from_millis(100), sub.next())
        .await
        .expect("republished snapshot should be observed");
    assert!(again.is_some());
}

#[tokio::test]
async fn test_every_subscriber_sees_update() {
    let bus = UpdateBus::new();
    let mut a = bus.subscribe("g1");
    let mut b = bus.subscribe("g1");
    assert_eq!(bus.subscriber_count(), 2);

    bus.publish(update("g1", 12, 0, 0));

    assert_eq!(a.next().await.unwrap().current_minute, 12);
    assert_eq!(b.next().await.unwrap().current_minute, 12);

    drop(a);
    assert_eq!(bus.subscriber_count(), 1);
}

#[tokio::test]
async fn test_latest_lookup() {
    let bus = UpdateBus::new();
    assert!(bus.latest("g1").is_none());

    bus.publish(update("g1", 1, 0, 0));
    bus.publish(update("g1", 2, 0, 0));
    assert_eq!(bus.latest("g1").unwrap().current_minute, 2);
    assert!(bus.latest("g2").is_none());
}

#[tokio::test]
async fn test_subscription_ends_when_bus_dropped() {
    let bus = UpdateBus::new();
    let mut sub = bus.subscribe("g1");
    drop(bus);

    assert!(sub.next().await.is_none());
}
