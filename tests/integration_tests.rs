// Integration tests for Call to Arms

use call_to_arms::config::DatabaseSettings;
use call_to_arms::core::{PairingGenerator, PairingOptions, RecentOpponents, WeekId};
use call_to_arms::models::{GameSystem, PairingStatus, Signup, SignupDetails};
use call_to_arms::services::{Backend, Database};
use chrono::{Duration, Utc};
use std::collections::HashSet;

fn create_signup(id: i64, name: &str, vibe: &str, experience: &str, points: i64) -> Signup {
    Signup {
        id,
        created_at: Utc::now() + Duration::seconds(id),
        week: "15/10/2025".to_string(),
        system: GameSystem::Tow,
        player_id: Some(id),
        player_name: name.to_string(),
        details: SignupDetails {
            faction: Some("Empire of Man".to_string()),
            points: Some(points),
            eta: Some("18:30".to_string()),
            experience: Some(experience.to_string()),
            vibe: Some(vibe.to_string()),
            scenario: Some("Open Battle".to_string()),
            ..SignupDetails::default()
        },
    }
}

fn tow_details(vibe: &str, points: i64) -> SignupDetails {
    SignupDetails {
        faction: Some("Skaven".to_string()),
        points: Some(points),
        eta: Some("18:30".to_string()),
        experience: Some("Some".to_string()),
        vibe: Some(vibe.to_string()),
        scenario: Some("Open Battle".to_string()),
        ..SignupDetails::default()
    }
}

#[test]
fn test_integration_end_to_end_generation() {
    let mut demo = create_signup(5, "Eve", "Competitive", "Veteran", 2000);
    demo.details.can_demo = true;

    let signups = vec![
        create_signup(1, "Alice", "Casual", "New", 1000),
        create_signup(2, "Bob", "Competitive", "Veteran", 2500),
        create_signup(3, "Carol", "Casual", "New", 1000),
        create_signup(4, "Dan", "Intro", "New", 500),
        demo,
        create_signup(6, "Frank", "Competitive", "Veteran", 2500),
        create_signup(7, "Grace", "Competitive", "Veteran", 4000),
    ];

    let plan = PairingGenerator::default().generate(GameSystem::Tow, signups, &RecentOpponents::default());

    assert_eq!(plan.candidates, 7);
    assert_eq!(plan.intro_pairs, 1);
    assert_eq!(plan.byes, 1);

    // Intro seeker is paired with the demo player first
    assert_eq!(plan.pairings[0].a_signup_id, 4);
    assert_eq!(plan.pairings[0].b_signup_id, Some(5));

    let pairs: HashSet<(i64, Option<i64>)> = plan
        .pairings
        .iter()
        .map(|p| (p.a_signup_id, p.b_signup_id))
        .collect();
    assert!(pairs.contains(&(1, Some(3))));
    assert!(pairs.contains(&(2, Some(6))));
    assert!(pairs.contains(&(7, None)));

    // Every player appears exactly once
    let mut seen = HashSet::new();
    for p in &plan.pairings {
        assert!(seen.insert(p.a_signup_id));
        if let Some(b) = p.b_signup_id {
            assert!(seen.insert(b));
        }
    }
    assert_eq!(seen.len(), 7);
}

#[test]
fn test_duplicate_signups_collapse_to_latest() {
    let signups = vec![
        create_signup(1, "Alice", "Casual", "New", 1000),
        create_signup(2, "Bob", "Casual", "New", 1000),
        create_signup(3, "ALICE", "Competitive", "Veteran", 2500),
    ];

    let plan = PairingGenerator::default().generate(GameSystem::Tow, signups, &RecentOpponents::default());
    assert_eq!(plan.candidates, 2);
    assert_eq!(plan.pairings.len(), 1);

    let p = &plan.pairings[0];
    let ids: HashSet<i64> = [Some(p.a_signup_id), p.b_signup_id].into_iter().flatten().collect();
    assert_eq!(ids, HashSet::from([2, 3]));
}

#[test]
fn test_recent_history_window() {
    let target: WeekId = "15/10/2025".parse().unwrap();
    let history = [
        ("08/10/2025", "Alice", "Bob"),
        ("01/10/2025", "Carol", "Dan"),
        ("24/09/2025", "Eve", "Frank"),
        ("not a week", "Grace", "Heidi"),
        ("08/10/2025", "Ivan", " ivan "),
    ];

    let recent = RecentOpponents::from_history(&target, history, 2);
    assert!(recent.contains("alice", "bob"));
    assert!(recent.contains("bob", "alice"));
    assert!(recent.contains("carol", "dan"));
    assert!(!recent.contains("eve", "frank"));
    assert!(!recent.contains("grace", "heidi"));
    assert_eq!(recent.len(), 2);
}

#[test]
fn test_rematch_fallback_prefers_fresh_opponent() {
    let signups = vec![
        create_signup(1, "Alice", "Casual", "Some", 2000),
        create_signup(2, "Bob", "Casual", "Some", 2000),
        create_signup(3, "Carol", "Competitive", "Veteran", 3000),
    ];
    let mut recent = RecentOpponents::default();
    recent.insert("Alice", "Bob");

    let plan = PairingGenerator::new(PairingOptions { allow_rematches: true })
        .generate(GameSystem::Tow, signups, &recent);

    // A worse but fresh opponent beats a perfect rematch
    let first = &plan.pairings[0];
    assert_eq!(first.a_signup_id, 1);
    assert_eq!(first.b_signup_id, Some(3));
}

#[tokio::test]
async fn test_generation_round_trip_through_database() {
    let db = Database::in_memory().await.unwrap();
    let week = "15/10/2025";

    for (name, vibe) in [("Alice", "Casual"), ("Bob", "Casual"), ("Carol", "Competitive")] {
        let (player, _) = db.find_or_create_player(name).await.unwrap();
        db.insert_signup(week, GameSystem::Tow, &player, &tow_details(vibe, 2000))
            .await
            .unwrap();
    }

    let signups = db.list_signups(week, GameSystem::Tow).await.unwrap();
    assert_eq!(signups.len(), 3);

    let plan = PairingGenerator::default().generate(GameSystem::Tow, signups, &RecentOpponents::default());
    let (removed, created) = db
        .replace_pending_pairings(week, GameSystem::Tow, &plan.pairings)
        .await
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|p| p.status == PairingStatus::Pending));

    // Regenerating replaces pending rows instead of piling up
    let (removed, created) = db
        .replace_pending_pairings(week, GameSystem::Tow, &plan.pairings)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(db.list_pairings(week, GameSystem::Tow).await.unwrap().len(), created.len());

    // Other systems are untouched
    assert!(db.list_pairings(week, GameSystem::HorusHeresy).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_past_games_skip_byes_and_regenerated_week() {
    let db = Database::in_memory().await.unwrap();
    let (alice, _) = db.find_or_create_player("Alice").await.unwrap();
    let (bob, _) = db.find_or_create_player("Bob").await.unwrap();

    for week in ["08/10/2025", "15/10/2025"] {
        let a = db.insert_signup(week, GameSystem::Tow, &alice, &tow_details("Casual", 2000)).await.unwrap();
        let b = db.insert_signup(week, GameSystem::Tow, &bob, &tow_details("Casual", 2000)).await.unwrap();
        let plan = PairingGenerator::default().generate(
            GameSystem::Tow,
            vec![a, b],
            &RecentOpponents::default(),
        );
        db.replace_pending_pairings(week, GameSystem::Tow, &plan.pairings).await.unwrap();
    }

    let past = db.past_games(GameSystem::Tow, "15/10/2025").await.unwrap();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].week, "08/10/2025");

    assert!(db.past_games(GameSystem::HorusHeresy, "15/10/2025").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signup_edit_and_delete() {
    let db = Database::in_memory().await.unwrap();
    let (player, created) = db.find_or_create_player("Karl Franz").await.unwrap();
    assert!(created);

    let signup = db
        .insert_signup("15/10/2025", GameSystem::Tow, &player, &tow_details("Casual", 2000))
        .await
        .unwrap();

    let edited = db
        .update_signup(signup.id, &tow_details("Competitive", 2500))
        .await
        .unwrap();
    assert_eq!(edited.details.vibe.as_deref(), Some("Competitive"));
    assert_eq!(edited.details.points, Some(2500));
    assert_eq!(edited.player_name, "Karl Franz");

    assert!(db.update_signup(9999, &SignupDetails::default()).await.is_err());

    assert_eq!(db.delete_signups(&[signup.id, 9999]).await.unwrap(), 1);
    assert!(db.get_signup(signup.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_sqlite_file_created_on_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let settings = DatabaseSettings {
        sqlite_path: dir.path().join("pairings_db.sqlite"),
        ..DatabaseSettings::default()
    };

    let target = settings.resolve().unwrap();
    assert_eq!(target.backend, Backend::Sqlite);

    let db = Database::connect(&target, &settings).await.unwrap();
    assert!(db.health_check().await.unwrap());
    assert!(db.list_signups("15/10/2025", GameSystem::Tow).await.unwrap().is_empty());
    assert!(dir.path().join("pairings_db.sqlite").exists());

    db.find_or_create_player("Nagash").await.unwrap();
    let snapshot = db.sqlite_snapshot().await.unwrap().expect("file-backed database");
    assert!(snapshot.starts_with(b"SQLite format 3"));
}

#[tokio::test]
async fn test_in_memory_database_has_no_snapshot() {
    let db = Database::in_memory().await.unwrap();
    assert!(db.sqlite_snapshot().await.unwrap().is_none());
}
