/// Habit operations exposed to callers
///
/// Each submodule implements one operation against any `HabitStorage`. The
/// caller supplies an already verified owner and, where time matters, the
/// current instant, so every operation can be exercised with a fixed clock.

pub mod create;
pub mod delete;
pub mod list;
pub mod status;
pub mod toggle;

pub use create::*;
pub use delete::*;
pub use list::*;
pub use status::*;
pub use toggle::*;

use thiserror::Error;
use tracing::warn;

use crate::domain::{DomainError, Habit, HabitId, OwnerId};
use crate::storage::{HabitStorage, StorageError};

/// How many times a read-modify-write is attempted before a conflict is surfaced
const MAX_SAVE_ATTEMPTS: u32 = 2;

/// Errors surfaced to callers of the habit operations
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(#[from] DomainError),

    /// Unknown, deleted, or someone else's habit; deliberately indistinguishable
    #[error("Habit not found: {habit_id}")]
    NotFound { habit_id: String },

    #[error("Habit {habit_id} was modified concurrently, please try again")]
    ConcurrencyConflict { habit_id: String },

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for TrackerError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::HabitNotFound { habit_id } => TrackerError::NotFound { habit_id },
            StorageError::VersionConflict { habit_id, .. } => TrackerError::ConcurrencyConflict { habit_id },
            other => TrackerError::Storage(other),
        }
    }
}

/// Load a habit the owner is allowed to touch
///
/// Malformed ids, missing rows, other owners' habits and deleted habits all
/// come back as the same `NotFound`.
pub fn load_owned_habit<S: HabitStorage>(
    storage: &S,
    habit_id: &str,
    owner: &OwnerId,
) -> Result<Habit, TrackerError> {
    let not_found = || TrackerError::NotFound {
        habit_id: habit_id.to_string(),
    };

    let id = HabitId::from_string(habit_id).map_err(|_| not_found())?;

    let habit = match storage.get_habit(&id) {
        Ok(habit) => habit,
        Err(StorageError::HabitNotFound { .. }) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    if !habit.is_visible_to(owner) {
        return Err(not_found());
    }

    Ok(habit)
}

/// Run a read-modify-write cycle on one habit
///
/// The habit is loaded, handed to `mutate`, and saved with a version check.
/// If another writer got there first the whole cycle runs once more from a
/// fresh read; a second conflict is returned to the caller.
pub fn modify_owned_habit<S, T, F>(
    storage: &S,
    habit_id: &str,
    owner: &OwnerId,
    mut mutate: F,
) -> Result<(Habit, T), TrackerError>
where
    S: HabitStorage,
    F: FnMut(&mut Habit) -> Result<T, TrackerError>,
{
    let mut attempt = 1;

    loop {
        let mut habit = load_owned_habit(storage, habit_id, owner)?;
        let outcome = mutate(&mut habit)?;

        match storage.save_habit(&habit) {
            Ok(version) => {
                habit.version = version;
                return Ok((habit, outcome));
            }
            Err(StorageError::VersionConflict { .. }) if attempt < MAX_SAVE_ATTEMPTS => {
                warn!(habit_id, attempt, "version conflict while saving habit, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
