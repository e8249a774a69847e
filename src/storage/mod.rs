/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. A habit is
/// saved as one unit (row, completions and streak fields together) behind an
/// optimistic version check, so concurrent writers cannot interleave.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;
use crate::domain::{Habit, HabitId, OwnerId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Version conflict on habit {habit_id}: expected version {expected} is stale")]
    VersionConflict { habit_id: String, expected: u64 },

    #[error("Duplicate entry: habit {habit_id} already has a completion for {date}")]
    DuplicateEntry { habit_id: String, date: String },

    #[error("Stored data is invalid: {0}")]
    InvalidData(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits
///
/// This trait allows us to swap out SQLite (or wrap it in tests) while keeping
/// the same interface.
pub trait HabitStorage {
    /// Insert a newly created habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID, completions included, regardless of owner or state
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// List an owner's habits, newest created first
    fn list_habits(&self, owner: &OwnerId, active_only: bool) -> Result<Vec<Habit>, StorageError>;

    /// Persist a loaded habit atomically
    ///
    /// Succeeds only if the stored version still equals `habit.version` and
    /// returns the new version. A stale version yields `VersionConflict`.
    fn save_habit(&self, habit: &Habit) -> Result<u64, StorageError>;
}
