/// Tool for creating new habits
///
/// This module implements the habit_create tool.

use chrono::{DateTime, TimeZone};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{Habit, OwnerId};
use crate::storage::HabitStorage;
use crate::tools::TrackerError;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Name of the habit (1-100 characters)
    pub name: String,
    /// Optional longer description (up to 500 characters)
    #[serde(default)]
    pub description: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit: Habit,
    pub message: String,
}

/// Create a new habit for `owner`
///
/// Nothing is written when validation fails.
pub fn create_habit<S: HabitStorage, Tz: TimeZone>(
    storage: &S,
    owner: &OwnerId,
    params: CreateHabitParams,
    now: &DateTime<Tz>,
) -> Result<CreateHabitResponse, TrackerError> {
    let habit = Habit::new(owner.clone(), params.name, params.description, now)?;

    storage.create_habit(&habit)?;
    tracing::info!(habit_id = %habit.id, owner = %owner, "created habit");

    let message = format!("✅ Created habit '{}'! Ready to start your streak!", habit.name);
    Ok(CreateHabitResponse {
        success: true,
        habit,
        message,
    })
}
