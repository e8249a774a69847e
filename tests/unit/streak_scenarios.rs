/// Streak evaluation scenarios, driven through the pure evaluator and through toggles
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use habit_tracker::*;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn days_ago(n: i64) -> NaiveDate {
    today() - Duration::days(n)
}

fn noon(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap())
}

#[test]
fn test_only_today() {
    let streak = Streak::evaluate(vec![today()], today(), 0);
    assert_eq!((streak.current_streak, streak.best_streak), (1, 1));
}

#[test]
fn test_three_consecutive_days_ending_today() {
    let streak = Streak::evaluate(vec![today(), days_ago(1), days_ago(2)], today(), 0);
    assert_eq!((streak.current_streak, streak.best_streak), (3, 3));
}

#[test]
fn test_old_run_is_broken() {
    let streak = Streak::evaluate(vec![days_ago(10), days_ago(9)], today(), 0);
    assert_eq!((streak.current_streak, streak.best_streak), (0, 2));
}

#[test]
fn test_gap_ends_current_run() {
    let streak = Streak::evaluate(vec![today(), days_ago(3)], today(), 0);
    assert_eq!((streak.current_streak, streak.best_streak), (1, 1));
}

#[test]
fn test_run_ending_yesterday_is_still_alive() {
    let streak = Streak::evaluate(vec![days_ago(1), days_ago(2)], today(), 0);
    assert_eq!(streak.current_streak, 2);

    let lapsed = Streak::evaluate(vec![days_ago(2), days_ago(3)], today(), 0);
    assert_eq!(lapsed.current_streak, 0);
}

#[test]
fn test_unsorted_input_is_accepted() {
    let streak = Streak::evaluate(vec![days_ago(2), today(), days_ago(1)], today(), 0);
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.last_completed, Some(today()));
}

#[test]
fn test_previous_best_is_never_lowered() {
    let streak = Streak::evaluate(vec![today()], today(), 9);
    assert_eq!(streak.best_streak, 9);
    assert!(!streak.best_streak_updated);
}

#[test]
fn test_toggle_today_twice_on_empty_habit() {
    let owner = OwnerId::new("alice").unwrap();
    let now = noon(today());
    let mut habit = Habit::new(owner, "Stretch".to_string(), None, &now).unwrap();

    let (first, _) = habit.toggle_completion(&now, None).unwrap();
    let (second, streak) = habit.toggle_completion(&(now + Duration::hours(3)), None).unwrap();

    assert_eq!(first, ToggleAction::Completed);
    assert_eq!(second, ToggleAction::Uncompleted);
    assert!(habit.completions.is_empty());
    assert_eq!(streak.current_streak, 0);
    assert_eq!(habit.streak, 0);
}

#[test]
fn test_best_streak_monotonic_across_toggles() {
    let owner = OwnerId::new("alice").unwrap();
    let mut habit = Habit::new(owner, "Walk".to_string(), None, &noon(days_ago(20))).unwrap();
    let mut previous_best = 0;

    // Every other toggle on the same day undoes the previous one
    for n in (0..20).rev() {
        for _ in 0..=(n % 2) {
            habit.toggle_completion(&noon(days_ago(n)), None).unwrap();
            assert!(habit.best_streak >= previous_best);
            previous_best = habit.best_streak;
        }
    }

    assert!(habit.best_streak >= habit.streak);
}
