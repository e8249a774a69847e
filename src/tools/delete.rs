/// Tool for deleting habits
///
/// Deletion is soft: the habit is flagged inactive and disappears from every
/// listing and day view, while its completions and streaks stay on record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::OwnerId;
use crate::storage::HabitStorage;
use crate::tools::{modify_owned_habit, TrackerError};

/// Parameters for deleting a habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    /// ID of the habit to delete
    pub habit_id: String,
}

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub message: String,
}

/// Soft-delete one of the owner's habits
///
/// Deleting an already deleted habit reports `NotFound`, same as an unknown id.
pub fn soft_delete_habit<S: HabitStorage>(
    storage: &S,
    owner: &OwnerId,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, TrackerError> {
    let (habit, _) = modify_owned_habit(storage, &params.habit_id, owner, |habit| {
        habit.soft_delete();
        Ok(())
    })?;

    tracing::info!(habit_id = %habit.id, "soft deleted habit");

    Ok(DeleteHabitResponse {
        success: true,
        message: format!("🗑️ Deleted habit '{}'", habit.name),
    })
}
