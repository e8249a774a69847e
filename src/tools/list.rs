/// Tool for listing habits
///
/// This module implements the habit_list tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Habit, OwnerId};
use crate::storage::HabitStorage;
use crate::tools::TrackerError;

/// Parameters for listing habits (none yet; deleted habits are never listed)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {}

/// Summary statistics for the listed habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub total_completions: u32,
    pub best_streak: u32,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<Habit>,
    pub summary: HabitListSummary,
}

/// List the owner's active habits, newest created first
///
/// Each habit's `streak` is re-evaluated against `today`; the stored value is
/// only as fresh as the last toggle. Nothing is written back.
pub fn list_habits<S: HabitStorage>(
    storage: &S,
    owner: &OwnerId,
    _params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, TrackerError> {
    let mut habits = storage.list_habits(owner, true)?;
    for habit in &mut habits {
        habit.streak = habit.live_streak(today).current_streak;
    }

    let summary = HabitListSummary {
        total_habits: habits.len() as u32,
        total_completions: habits.iter().map(|h| h.completions.len() as u32).sum(),
        best_streak: habits.iter().map(|h| h.best_streak).max().unwrap_or(0),
    };

    Ok(ListHabitsResponse { habits, summary })
}
