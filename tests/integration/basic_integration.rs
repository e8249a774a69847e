/// Basic integration tests against an on-disk database
use chrono::{DateTime, Duration, TimeZone, Utc};
use habit_tracker::tools::*;
use habit_tracker::*;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

async fn open(dir: &TempDir, owner: &str) -> HabitTrackerServer {
    let db_path = dir.path().join("habits.db");
    HabitTrackerServer::new(db_path, OwnerId::new(owner).unwrap())
        .await
        .expect("Failed to create server")
}

fn create(server: &HabitTrackerServer, name: &str, now: &DateTime<Utc>) -> String {
    let params = CreateHabitParams {
        name: name.to_string(),
        description: None,
    };
    let response = assert_ok!(create_habit(server.storage(), server.owner(), params, now));
    response.habit.id.to_string()
}

fn toggle(server: &HabitTrackerServer, habit_id: &str, now: &DateTime<Utc>) -> ToggleCompletionResponse {
    let params = ToggleCompletionParams {
        habit_id: habit_id.to_string(),
        note: None,
    };
    assert_ok!(toggle_completion(server.storage(), server.owner(), params, now))
}

#[tokio::test]
async fn test_week_of_toggles_survives_restart() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let habit_id = {
        let server = open(&dir, "alice").await;
        let habit_id = create(&server, "Read 20 pages", &at(1, 8));
        for offset in 0..7 {
            toggle(&server, &habit_id, &(at(1, 20) + Duration::days(offset)));
        }
        habit_id
    };

    let server = open(&dir, "alice").await;
    let today = at(7, 21).date_naive();
    let listed = assert_ok!(list_habits(server.storage(), server.owner(), ListHabitsParams::default(), today));

    assert_eq!(listed.habits.len(), 1);
    let habit = &listed.habits[0];
    assert_eq!(habit.id.to_string(), habit_id);
    assert_eq!(habit.streak, 7);
    assert_eq!(habit.best_streak, 7);
    assert_eq!(habit.completions.len(), 7);
    assert_eq!(habit.version, 7);
}

#[tokio::test]
async fn test_gap_resets_current_but_not_best() {
    let dir = TempDir::new().unwrap();
    let server = open(&dir, "alice").await;
    let habit_id = create(&server, "Run", &at(1, 8));

    for day in [1, 2, 3] {
        toggle(&server, &habit_id, &at(day, 9));
    }
    // Two days skipped
    let response = toggle(&server, &habit_id, &at(6, 9));

    assert_eq!(response.streak.current_streak, 1);
    assert_eq!(response.streak.best_streak, 3);
    assert!(!response.streak.best_streak_updated);
}

#[tokio::test]
async fn test_owners_are_isolated() {
    let dir = TempDir::new().unwrap();
    let alice = open(&dir, "alice").await;
    let bob = open(&dir, "bob").await;
    let habit_id = create(&alice, "Journal", &at(1, 8));

    let bob_list = assert_ok!(list_habits(bob.storage(), bob.owner(), ListHabitsParams::default(), at(1, 9).date_naive()));
    assert!(bob_list.habits.is_empty());

    let params = ToggleCompletionParams {
        habit_id: habit_id.clone(),
        note: None,
    };
    let error = assert_err!(toggle_completion(bob.storage(), bob.owner(), params, &at(1, 9)));
    assert!(matches!(error, TrackerError::NotFound { .. }));

    let params = DeleteHabitParams { habit_id };
    let error = assert_err!(soft_delete_habit(bob.storage(), bob.owner(), params));
    assert!(matches!(error, TrackerError::NotFound { .. }));
}

#[tokio::test]
async fn test_deleted_habit_disappears_everywhere() {
    let dir = TempDir::new().unwrap();
    let server = open(&dir, "alice").await;
    let habit_id = create(&server, "Floss", &at(1, 8));
    toggle(&server, &habit_id, &at(2, 9));

    assert_ok!(soft_delete_habit(
        server.storage(),
        server.owner(),
        DeleteHabitParams { habit_id: habit_id.clone() }
    ));

    let listed = assert_ok!(list_habits(server.storage(), server.owner(), ListHabitsParams::default(), at(3, 9).date_naive()));
    assert!(listed.habits.is_empty());

    let day = assert_ok!(day_overview(
        server.storage(),
        server.owner(),
        DayOverviewParams { date: Some("2024-05-02".to_string()) },
        at(3, 9).date_naive()
    ));
    assert_eq!(day.total, 0);

    let params = ToggleCompletionParams { habit_id, note: None };
    let error = assert_err!(toggle_completion(server.storage(), server.owner(), params, &at(3, 9)));
    assert!(matches!(error, TrackerError::NotFound { .. }));
}

#[tokio::test]
async fn test_day_view_only_lists_habits_that_existed() {
    let dir = TempDir::new().unwrap();
    let server = open(&dir, "alice").await;
    let old = create(&server, "Old habit", &at(1, 8));
    create(&server, "New habit", &at(10, 8));
    toggle(&server, &old, &at(5, 9));

    let today = at(12, 9).date_naive();
    let params = DayOverviewParams { date: Some("2024-05-05".to_string()) };
    let day = assert_ok!(day_overview(server.storage(), server.owner(), params, today));

    assert_eq!(day.total, 1);
    assert_eq!(day.completed, 1);
    assert_eq!(day.habits[0].name, "Old habit");

    let stats = assert_ok!(dashboard(server.storage(), server.owner(), StatsParams::default(), today));
    assert_eq!(stats.total_habits, 2);
    assert_eq!(stats.completed_today, 0);
    assert_eq!(stats.best_streak, 1);
}

#[tokio::test]
async fn test_listing_after_a_break_shows_broken_streak() {
    let dir = TempDir::new().unwrap();
    let server = open(&dir, "alice").await;
    let habit_id = create(&server, "Meditate", &at(1, 8));
    for day in 1..=5 {
        toggle(&server, &habit_id, &at(day, 9));
    }

    let listed = assert_ok!(list_habits(
        server.storage(),
        server.owner(),
        ListHabitsParams::default(),
        at(26, 9).date_naive()
    ));
    let habit = &listed.habits[0];

    assert_eq!(habit.streak, habit.live_streak(at(26, 9).date_naive()).current_streak);
    assert_eq!(habit.streak, 0);
    assert_eq!(habit.best_streak, 5);
}
