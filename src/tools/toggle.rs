/// Tool for marking or unmarking today's completion
///
/// This module implements the habit_toggle tool: flip today's completion,
/// recompute streaks against today, and save everything in one write.

use chrono::{DateTime, TimeZone};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Habit, OwnerId, Streak, ToggleAction};
use crate::storage::HabitStorage;
use crate::tools::{modify_owned_habit, TrackerError};

/// Parameters for toggling today's completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleCompletionParams {
    /// ID of the habit to toggle
    pub habit_id: String,
    /// Optional note stored with a new completion (up to 200 characters)
    #[serde(default)]
    pub note: Option<String>,
}

/// Response from toggling a habit
#[derive(Debug, Serialize)]
pub struct ToggleCompletionResponse {
    pub habit: Habit,
    pub action: ToggleAction,
    pub streak: Streak,
    pub message: String,
}

/// Toggle today's completion of a habit
///
/// "Today" is `now` reduced to its calendar day in its own time zone. The
/// streak is always evaluated against that day.
pub fn toggle_completion<S: HabitStorage, Tz: TimeZone>(
    storage: &S,
    owner: &OwnerId,
    params: ToggleCompletionParams,
    now: &DateTime<Tz>,
) -> Result<ToggleCompletionResponse, TrackerError> {
    let (habit, (action, streak)) = modify_owned_habit(storage, &params.habit_id, owner, |habit| {
        Ok(habit.toggle_completion(now, params.note.clone())?)
    })?;

    tracing::info!(
        habit_id = %habit.id,
        ?action,
        streak = streak.current_streak,
        best_streak = streak.best_streak,
        "toggled habit completion"
    );

    let message = match action {
        ToggleAction::Completed => {
            let mut message = format!(
                "🔥 Marked '{}' done for today! Current streak: {} day{}. {}",
                habit.name,
                streak.current_streak,
                if streak.current_streak == 1 { "" } else { "s" },
                streak.motivational_message()
            );
            if streak.best_streak_updated {
                message.push_str(&format!(" New best streak: {}!", streak.best_streak));
            }
            message
        }
        ToggleAction::Uncompleted => format!(
            "↩️ Unmarked '{}' for today. Current streak: {} day{}.",
            habit.name,
            streak.current_streak,
            if streak.current_streak == 1 { "" } else { "s" }
        ),
    };

    Ok(ToggleCompletionResponse {
        habit,
        action,
        streak,
        message,
    })
}
