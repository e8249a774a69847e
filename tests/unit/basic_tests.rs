/// Basic unit tests to verify core functionality
use chrono::{FixedOffset, TimeZone, Utc};
use habit_tracker::*;

#[test]
fn test_habit_creation() {
    let owner = OwnerId::new("alice").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

    let habit = Habit::new(owner.clone(), "  Test Habit  ".to_string(), Some("A test habit".to_string()), &now);

    assert!(habit.is_ok());
    let habit = habit.unwrap();
    assert_eq!(habit.name, "Test Habit");
    assert_eq!(habit.owner, owner);
    assert_eq!(habit.streak, 0);
    assert_eq!(habit.best_streak, 0);
    assert!(habit.completions.is_empty());
    assert!(habit.is_active);
}

#[test]
fn test_habit_validation() {
    let owner = OwnerId::new("alice").unwrap();
    let now = Utc::now();

    assert!(Habit::new(owner.clone(), "".to_string(), None, &now).is_err());
    assert!(Habit::new(owner.clone(), "x".repeat(101), None, &now).is_err());
    assert!(Habit::new(owner.clone(), "x".repeat(100), None, &now).is_ok());
    assert!(Habit::new(owner, "Ok".to_string(), Some("d".repeat(501)), &now).is_err());
}

#[test]
fn test_owner_validation() {
    assert!(OwnerId::new("   ").is_err());
    assert!(OwnerId::new("o".repeat(129)).is_err());
    assert_eq!(OwnerId::new(" carol ").unwrap().as_str(), "carol");
}

#[test]
fn test_habit_id_parsing() {
    let id = HabitId::new();
    assert_eq!(HabitId::from_string(&id.to_string()).unwrap(), id);
    assert!(HabitId::from_string("not-a-uuid").is_err());
}

#[test]
fn test_completion_day_follows_local_time_zone() {
    // 23:30 in UTC-5 is already the next day in UTC
    let new_york = FixedOffset::west_opt(5 * 3600).unwrap();
    let now = new_york.with_ymd_and_hms(2024, 2, 29, 23, 30, 0).unwrap();

    let completion = Completion::new(&now, None).unwrap();

    assert_eq!(completion.day.to_string(), "2024-02-29");
    assert_eq!(completion.logged_at.to_rfc3339(), "2024-03-01T04:30:00+00:00");
}

#[test]
fn test_completion_note_limits() {
    let now = Utc::now();

    assert!(Completion::new(&now, Some("n".repeat(200))).is_ok());
    assert!(Completion::new(&now, Some("n".repeat(201))).is_err());
    assert!(Completion::new(&now, Some("   ".to_string())).unwrap().note.is_none());
}

#[test]
fn test_ledger_keeps_one_record_per_day() {
    let mut ledger = CompletionLedger::new();
    let morning = Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap();
    let evening = Utc.with_ymd_and_hms(2024, 1, 15, 19, 0, 0).unwrap();

    assert!(ledger.insert(Completion::new(&morning, None).unwrap()));
    assert!(!ledger.insert(Completion::new(&evening, None).unwrap()));
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.remove_day(morning.date_naive()), 1);
    assert!(ledger.is_empty());
}

#[test]
fn test_streak_motivational_messages() {
    let today = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap().date_naive();

    let none = Streak::evaluate(Vec::new(), today, 0);
    assert!(!none.motivational_message().is_empty());
    assert!(!none.is_live(today));

    let one = Streak::evaluate(vec![today], today, 0);
    assert!(one.is_live(today));
    assert_ne!(one.motivational_message(), none.motivational_message());
}
