/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use crate::domain::{Completion, CompletionLedger, Habit, HabitId, OwnerId};
use crate::storage::{migrations, HabitStorage, StorageError};

const HABIT_COLUMNS: &str =
    "id, owner, name, description, streak, best_streak, created_at, created_on, is_active, version";

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex, so every statement (and every save
/// transaction) runs one at a time even when the storage is shared.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Create a throwaway in-memory database
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("Database connection lock poisoned".to_string()))
    }

    /// Build a habit from a row selected with `HABIT_COLUMNS`
    ///
    /// Completions are loaded separately and start out empty here.
    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let owner_str: String = row.get(1)?;
        let owner = OwnerId::new(owner_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(1, "Invalid owner".to_string(), rusqlite::types::Type::Text)
        })?;

        let created_at = parse_instant(row, 6)?;
        let created_on = parse_day(row, 7)?;
        let version: i64 = row.get(9)?;

        Ok(Habit::from_existing(
            id,
            owner,
            row.get(2)?, // name
            row.get(3)?, // description
            CompletionLedger::new(),
            row.get(4)?, // streak
            row.get(5)?, // best_streak
            created_at,
            created_on,
            row.get(8)?, // is_active
            version.max(0) as u64,
        ))
    }

    fn load_completions(conn: &Connection, habit_id: &HabitId) -> Result<CompletionLedger, StorageError> {
        let mut stmt = conn.prepare(
            "SELECT day, logged_at, note FROM habit_completions
             WHERE habit_id = ?1
             ORDER BY day DESC",
        )?;

        let completions = stmt
            .query_map(params![habit_id.to_string()], |row| {
                Ok(Completion::from_existing(
                    parse_day(row, 0)?,
                    parse_instant(row, 1)?,
                    row.get(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompletionLedger::from_completions(completions))
    }
}

/// Read a `%Y-%m-%d` column
fn parse_day(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::InvalidColumnType(idx, "Invalid date".to_string(), rusqlite::types::Type::Text)
    })
}

/// Read an RFC 3339 column as UTC
fn parse_instant(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, "Invalid datetime".to_string(), rusqlite::types::Type::Text)
        })
}

fn is_constraint_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO habits (
                id, owner, name, description, streak, best_streak,
                created_at, created_on, is_active, version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                habit.id.to_string(),
                habit.owner.as_str(),
                habit.name,
                habit.description,
                habit.streak,
                habit.best_streak,
                habit.created_at.to_rfc3339(),
                habit.created_on.to_string(),
                habit.is_active,
                habit.version as i64,
            ],
        )?;

        insert_completions(&tx, habit)?;
        tx.commit()?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let conn = self.connection()?;

        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let habit = conn
            .query_row(&sql, params![habit_id.to_string()], Self::habit_from_row)
            .optional()?;

        let mut habit = habit.ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })?;
        habit.completions = Self::load_completions(&conn, habit_id)?;

        Ok(habit)
    }

    fn list_habits(&self, owner: &OwnerId, active_only: bool) -> Result<Vec<Habit>, StorageError> {
        let conn = self.connection()?;

        let mut sql = format!("SELECT {} FROM habits WHERE owner = ?1", HABIT_COLUMNS);
        if active_only {
            sql.push_str(" AND is_active = 1");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = conn.prepare(&sql)?;
        let mut habits = stmt
            .query_map(params![owner.as_str()], Self::habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for habit in &mut habits {
            habit.completions = Self::load_completions(&conn, &habit.id)?;
        }

        Ok(habits)
    }

    fn save_habit(&self, habit: &Habit) -> Result<u64, StorageError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let habit_id = habit.id.to_string();

        let rows_affected = tx.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                streak = ?4,
                best_streak = ?5,
                is_active = ?6,
                version = version + 1
             WHERE id = ?1 AND version = ?7",
            params![
                habit_id,
                habit.name,
                habit.description,
                habit.streak,
                habit.best_streak,
                habit.is_active,
                habit.version as i64,
            ],
        )?;

        if rows_affected == 0 {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM habits WHERE id = ?1)",
                params![habit_id],
                |row| row.get(0),
            )?;

            // Dropping the transaction rolls it back
            return Err(if exists {
                StorageError::VersionConflict {
                    habit_id,
                    expected: habit.version,
                }
            } else {
                StorageError::HabitNotFound { habit_id }
            });
        }

        tx.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1",
            params![habit_id],
        )?;
        insert_completions(&tx, habit)?;
        tx.commit()?;

        tracing::debug!(
            "Saved habit {} at version {} ({} completions, streak {}, best {})",
            habit.id,
            habit.version + 1,
            habit.completions.len(),
            habit.streak,
            habit.best_streak
        );
        Ok(habit.version + 1)
    }
}

fn insert_completions(conn: &Connection, habit: &Habit) -> Result<(), StorageError> {
    let mut stmt = conn.prepare(
        "INSERT INTO habit_completions (habit_id, day, logged_at, note)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    for completion in habit.completions.iter() {
        stmt.execute(params![
            habit.id.to_string(),
            completion.day.to_string(),
            completion.logged_at.to_rfc3339(),
            completion.note,
        ])
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StorageError::DuplicateEntry {
                    habit_id: habit.id.to_string(),
                    date: completion.day.to_string(),
                }
            } else {
                StorageError::Query(e)
            }
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn new_habit(owner_name: &str, name: &str, created: DateTime<Utc>) -> Habit {
        Habit::new(owner(owner_name), name.to_string(), None, &created).unwrap()
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = new_habit("alice", "Read", at(1, 9));
        storage.create_habit(&habit).unwrap();

        let loaded = storage.get_habit(&habit.id).unwrap();
        assert_eq!(loaded, habit);
    }

    #[test]
    fn test_get_missing_habit() {
        let storage = SqliteStorage::in_memory().unwrap();
        let result = storage.get_habit(&HabitId::new());
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }

    #[test]
    fn test_save_persists_completions_and_streaks_together() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut habit = new_habit("alice", "Read", at(1, 9));
        storage.create_habit(&habit).unwrap();

        habit.toggle_completion(&at(2, 9), Some("chapter 3".to_string())).unwrap();
        habit.version = storage.save_habit(&habit).unwrap();
        assert_eq!(habit.version, 1);

        let loaded = storage.get_habit(&habit.id).unwrap();
        assert_eq!(loaded.completions.len(), 1);
        assert_eq!(loaded.streak, 1);
        assert_eq!(loaded.best_streak, 1);
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.completions.iter().next().unwrap().note.as_deref(), Some("chapter 3"));
    }

    #[test]
    fn test_stale_version_is_rejected_and_nothing_written() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = new_habit("alice", "Read", at(1, 9));
        storage.create_habit(&habit).unwrap();

        let mut first = storage.get_habit(&habit.id).unwrap();
        let mut second = storage.get_habit(&habit.id).unwrap();

        first.toggle_completion(&at(2, 9), None).unwrap();
        storage.save_habit(&first).unwrap();

        second.toggle_completion(&at(2, 10), None).unwrap();
        second.name = "Renamed".to_string();
        let result = storage.save_habit(&second);
        assert!(matches!(result, Err(StorageError::VersionConflict { expected: 0, .. })));

        let loaded = storage.get_habit(&habit.id).unwrap();
        assert_eq!(loaded.name, "Read");
        assert_eq!(loaded.completions.len(), 1);
    }

    #[test]
    fn test_save_unknown_habit() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = new_habit("alice", "Read", at(1, 9));

        let result = storage.save_habit(&habit);
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }

    #[test]
    fn test_duplicate_day_in_ledger_rejected_atomically() {
        let storage = SqliteStorage::in_memory().unwrap();
        let mut habit = new_habit("alice", "Read", at(1, 9));
        storage.create_habit(&habit).unwrap();

        let day = at(2, 9).date_naive();
        habit.completions = CompletionLedger::from_completions(vec![
            Completion::from_existing(day, at(2, 9), None),
            Completion::from_existing(day, at(2, 10), None),
        ]);
        habit.streak = 1;

        let result = storage.save_habit(&habit);
        assert!(matches!(result, Err(StorageError::DuplicateEntry { .. })));

        let loaded = storage.get_habit(&habit.id).unwrap();
        assert_eq!(loaded.version, 0);
        assert_eq!(loaded.streak, 0);
        assert!(loaded.completions.is_empty());
    }

    #[test]
    fn test_list_filters_by_owner_and_state_newest_first() {
        let storage = SqliteStorage::in_memory().unwrap();

        let older = new_habit("alice", "Older", at(1, 9));
        let newer = new_habit("alice", "Newer", at(3, 9));
        let mut deleted = new_habit("alice", "Deleted", at(2, 9));
        let foreign = new_habit("bob", "Foreign", at(4, 9));

        for habit in [&older, &newer, &deleted, &foreign] {
            storage.create_habit(habit).unwrap();
        }

        deleted.soft_delete();
        storage.save_habit(&deleted).unwrap();

        let active = storage.list_habits(&owner("alice"), true).unwrap();
        let names: Vec<&str> = active.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older"]);

        let all = storage.list_habits(&owner("alice"), false).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_data_survives_reopen() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("habits.db");

        let habit = new_habit("alice", "Read", at(1, 9));
        {
            let storage = SqliteStorage::new(&db_path).unwrap();
            storage.create_habit(&habit).unwrap();
        }

        let storage = SqliteStorage::new(&db_path).unwrap();
        assert_eq!(storage.get_habit(&habit.id).unwrap().name, "Read");
    }
}
