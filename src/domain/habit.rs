/// Habit entity and related functionality
///
/// This module defines the core Habit struct: a named daily task owned by one
/// user, carrying its completion ledger and the streak figures derived from it.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Completion, CompletionLedger, DomainError, HabitId, OwnerId, Streak};

/// Longest habit name, in characters
pub const MAX_NAME_LENGTH: usize = 100;

/// Longest habit description, in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A habit represents something the user wants to do every day
///
/// Streak fields are cached results of the last evaluation. They are only
/// rewritten together with the ledger, so a persisted habit never carries a
/// ledger and streak that disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// User this habit belongs to
    pub owner: OwnerId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Days this habit was completed on
    pub completions: CompletionLedger,
    /// Current streak as of the last toggle
    pub streak: u32,
    /// Best streak ever recorded
    pub best_streak: u32,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Local calendar day of creation
    pub created_on: NaiveDate,
    /// False once the habit has been deleted
    pub is_active: bool,
    /// Bumped by storage on every successful save
    pub version: u64,
}

/// What a toggle did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Completed,
    Uncompleted,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// `now` supplies both the creation instant and, through its time zone,
    /// the local day the habit starts applying from.
    pub fn new<Tz: TimeZone>(
        owner: OwnerId,
        name: String,
        description: Option<String>,
        now: &DateTime<Tz>,
    ) -> Result<Self, DomainError> {
        let name = name.trim().to_string();
        let description = description
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Self::validate_name(&name)?;
        Self::validate_description(&description)?;

        Ok(Self {
            id: HabitId::new(),
            owner,
            name,
            description,
            completions: CompletionLedger::new(),
            streak: 0,
            best_streak: 0,
            created_at: now.with_timezone(&Utc),
            created_on: now.date_naive(),
            is_active: true,
            version: 0,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        owner: OwnerId,
        name: String,
        description: Option<String>,
        completions: CompletionLedger,
        streak: u32,
        best_streak: u32,
        created_at: DateTime<Utc>,
        created_on: NaiveDate,
        is_active: bool,
        version: u64,
    ) -> Self {
        Self {
            id,
            owner,
            name,
            description,
            completions,
            streak,
            best_streak,
            created_at,
            created_on,
            is_active,
            version,
        }
    }

    /// Whether `owner` may see and modify this habit
    pub fn is_visible_to(&self, owner: &OwnerId) -> bool {
        self.is_active && &self.owner == owner
    }

    /// A habit only shows up on days from its creation day onward
    pub fn is_applicable_on(&self, day: NaiveDate) -> bool {
        day >= self.created_on
    }

    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completions.contains_day(day)
    }

    /// Flip today's completion and recompute the streak fields
    ///
    /// Today is `now` reduced to its calendar day. An existing completion for
    /// that day is removed; otherwise a new one is recorded with `note`.
    pub fn toggle_completion<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
        note: Option<String>,
    ) -> Result<(ToggleAction, Streak), DomainError> {
        let today = now.date_naive();

        let action = if self.completions.contains_day(today) {
            let removed = self.completions.remove_day(today);
            if removed > 1 {
                tracing::warn!(
                    habit_id = %self.id,
                    day = %today,
                    removed,
                    "removed duplicate completions for a single day"
                );
            }
            ToggleAction::Uncompleted
        } else {
            self.completions.insert(Completion::new(now, note)?);
            ToggleAction::Completed
        };

        Ok((action, self.recompute_streaks(today)))
    }

    /// Re-evaluate the ledger against `today` and store the result
    pub fn recompute_streaks(&mut self, today: NaiveDate) -> Streak {
        let streak = self.live_streak(today);
        self.streak = streak.current_streak;
        self.best_streak = streak.best_streak;
        streak
    }

    /// Evaluate the ledger against `today` without touching the habit
    pub fn live_streak(&self, today: NaiveDate) -> Streak {
        Streak::evaluate(self.completions.days(), today, self.best_streak)
    }

    /// Mark the habit deleted; history and streak lineage are kept
    pub fn soft_delete(&mut self) {
        self.is_active = false;
    }

    // Validation helper methods

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::InvalidHabitName(format!(
                "Habit name cannot be longer than {} characters",
                MAX_NAME_LENGTH
            )));
        }

        Ok(())
    }

    /// Validate optional description
    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > MAX_DESCRIPTION_LENGTH {
                return Err(DomainError::Validation {
                    message: format!(
                        "Description cannot be longer than {} characters",
                        MAX_DESCRIPTION_LENGTH
                    ),
                });
            }
        }
        Ok(())
    }
}
