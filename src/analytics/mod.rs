/// Day-based views over a user's habits
///
/// These are read-only summaries: which habits apply to a calendar day and
/// how many of them were done, a month of such days for calendar display,
/// and the headline numbers for a dashboard. Streaks shown here are
/// re-evaluated against `today`, since stored streaks are only as fresh as
/// the last toggle.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{DomainError, Habit};

/// How a calendar day went, across all habits that applied to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// After today; nothing can be recorded yet
    Future,
    /// No habit existed on this day
    NoHabits,
    /// Habits applied but none were completed
    Missed,
    /// Some but not all applicable habits were completed
    Partial,
    /// Every applicable habit was completed
    Completed,
}

/// One habit as seen on a particular day
#[derive(Debug, Clone, Serialize)]
pub struct HabitDayEntry {
    pub habit_id: String,
    pub name: String,
    pub completed: bool,
    pub note: Option<String>,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_completions: u32,
}

/// Everything shown for a single selected day
#[derive(Debug, Clone, Serialize)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub is_today: bool,
    pub status: DayStatus,
    pub completed: u32,
    pub total: u32,
    pub completion_rate: f64,
    pub habits: Vec<HabitDayEntry>,
}

/// One cell of a month calendar
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: DayStatus,
    pub completed: u32,
    pub total: u32,
}

/// Totals over the non-future days of a month
#[derive(Debug, Clone, Serialize)]
pub struct MonthSummary {
    /// Days on which at least one habit applied
    pub tracked_days: u32,
    /// Days on which every applicable habit was completed
    pub perfect_days: u32,
    /// Completed habit-days over applicable habit-days
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub summary: MonthSummary,
}

/// Headline numbers for the owner's active habits
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_habits: u32,
    pub completed_today: u32,
    pub best_streak: u32,
    /// Habits whose streak is still alive today
    pub live_streaks: u32,
}

/// (status, completed, applicable) for one day
fn day_tally(habits: &[Habit], day: NaiveDate, today: NaiveDate) -> (DayStatus, u32, u32) {
    if day > today {
        return (DayStatus::Future, 0, 0);
    }

    let applicable = habits.iter().filter(|h| h.is_applicable_on(day));
    let (total, completed) = applicable.fold((0u32, 0u32), |(total, completed), habit| {
        (total + 1, completed + u32::from(habit.is_completed_on(day)))
    });

    let status = match (total, completed) {
        (0, _) => DayStatus::NoHabits,
        (_, 0) => DayStatus::Missed,
        (t, c) if c == t => DayStatus::Completed,
        _ => DayStatus::Partial,
    };

    (status, completed, total)
}

fn rate(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

impl DayOverview {
    /// Build the view of `day`, listing only habits that existed on it
    pub fn build(habits: &[Habit], day: NaiveDate, today: NaiveDate) -> Self {
        let (status, completed, total) = day_tally(habits, day, today);

        let entries = habits
            .iter()
            .filter(|habit| habit.is_applicable_on(day))
            .map(|habit| {
                let streak = habit.live_streak(today);
                HabitDayEntry {
                    habit_id: habit.id.to_string(),
                    name: habit.name.clone(),
                    completed: habit.is_completed_on(day),
                    note: habit.completions.find(day).and_then(|c| c.note.clone()),
                    current_streak: streak.current_streak,
                    best_streak: streak.best_streak,
                    total_completions: streak.total_completions,
                }
            })
            .collect();

        Self {
            date: day,
            is_today: day == today,
            status,
            completed,
            total,
            completion_rate: rate(completed, total),
            habits: entries,
        }
    }
}

impl MonthCalendar {
    /// Build a calendar for `month` (1-12) of `year`
    pub fn build(habits: &[Habit], year: i32, month: u32, today: NaiveDate) -> Result<Self, DomainError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            DomainError::InvalidDate(format!("{}-{:02} is not a valid month", year, month))
        })?;

        let days: Vec<CalendarDay> = first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| {
                let (status, completed, total) = day_tally(habits, date, today);
                CalendarDay {
                    date,
                    status,
                    completed,
                    total,
                }
            })
            .collect();

        let tracked = days.iter().filter(|d| d.total > 0);
        let tracked_days = tracked.clone().count() as u32;
        let perfect_days = tracked.clone().filter(|d| d.status == DayStatus::Completed).count() as u32;
        let (completed, total) = tracked.fold((0, 0), |(c, t), d| (c + d.completed, t + d.total));

        Ok(Self {
            year,
            month,
            days,
            summary: MonthSummary {
                tracked_days,
                perfect_days,
                completion_rate: rate(completed, total),
            },
        })
    }
}

impl DashboardStats {
    pub fn build(habits: &[Habit], today: NaiveDate) -> Self {
        let mut stats = Self {
            total_habits: habits.len() as u32,
            completed_today: 0,
            best_streak: 0,
            live_streaks: 0,
        };

        for habit in habits {
            let streak = habit.live_streak(today);
            if habit.is_completed_on(today) {
                stats.completed_today += 1;
            }
            if streak.current_streak > 0 {
                stats.live_streaks += 1;
            }
            stats.best_streak = stats.best_streak.max(streak.best_streak);
        }

        stats
    }
}
