/// Completion records and the per-habit ledger that holds them
///
/// A completion says "this habit was done on this calendar day". The ledger
/// keeps at most one completion per day; toggling a day either inserts the
/// record or takes it back out.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Longest note a user may attach to a completion
pub const MAX_NOTE_LENGTH: usize = 200;

/// A record of completing a habit on a specific day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Local calendar day this completion counts for
    pub day: NaiveDate,
    /// Instant the completion was recorded
    pub logged_at: DateTime<Utc>,
    /// User's notes about this completion
    pub note: Option<String>,
}

impl Completion {
    /// Record a completion at `now`
    ///
    /// The calendar day is taken in `now`'s own time zone, which is how the
    /// caller expresses "local midnight". Blank notes are dropped.
    pub fn new<Tz: TimeZone>(now: &DateTime<Tz>, note: Option<String>) -> Result<Self, DomainError> {
        let note = note.filter(|text| !text.trim().is_empty());
        Self::validate_note(&note)?;

        Ok(Self {
            day: now.date_naive(),
            logged_at: now.with_timezone(&Utc),
            note,
        })
    }

    /// Create a completion from existing data (used when loading from database)
    pub fn from_existing(day: NaiveDate, logged_at: DateTime<Utc>, note: Option<String>) -> Self {
        Self {
            day,
            logged_at,
            note,
        }
    }

    /// Check if this completion has notes
    pub fn has_note(&self) -> bool {
        self.note.as_deref().is_some_and(|text| !text.trim().is_empty())
    }

    fn validate_note(note: &Option<String>) -> Result<(), DomainError> {
        if let Some(text) = note {
            if text.chars().count() > MAX_NOTE_LENGTH {
                return Err(DomainError::Validation {
                    message: format!("Notes cannot be longer than {} characters", MAX_NOTE_LENGTH),
                });
            }
        }
        Ok(())
    }
}

/// The set of completions recorded for one habit
///
/// Order carries no meaning. Inserts refuse a second completion for a day
/// that is already present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLedger {
    completions: Vec<Completion>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap completions loaded from storage as-is
    pub fn from_completions(completions: Vec<Completion>) -> Self {
        Self { completions }
    }

    pub fn len(&self) -> usize {
        self.completions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Completion> + '_ {
        self.completions.iter()
    }

    /// Calendar days of every completion, unsorted
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.completions.iter().map(|completion| completion.day)
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.completions.iter().any(|completion| completion.day == day)
    }

    pub fn find(&self, day: NaiveDate) -> Option<&Completion> {
        self.completions.iter().find(|completion| completion.day == day)
    }

    /// Add a completion unless its day is already taken
    ///
    /// Returns `false` and leaves the ledger untouched on a same-day insert.
    pub fn insert(&mut self, completion: Completion) -> bool {
        if self.contains_day(completion.day) {
            return false;
        }
        self.completions.push(completion);
        true
    }

    /// Remove every completion recorded for `day`
    ///
    /// Returns how many records were dropped. More than one only happens
    /// when the stored ledger was already inconsistent.
    pub fn remove_day(&mut self, day: NaiveDate) -> usize {
        let before = self.completions.len();
        self.completions.retain(|completion| completion.day != day);
        before - self.completions.len()
    }

    /// Most recent completed day, if any
    pub fn last_completed(&self) -> Option<NaiveDate> {
        self.days().max()
    }
}
