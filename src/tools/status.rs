/// Tools for day-based habit views
///
/// This module implements the habit_day, habit_calendar and habit_stats
/// tools on top of the analytics views.

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::analytics::{DashboardStats, DayOverview, MonthCalendar};
use crate::domain::{DomainError, OwnerId};
use crate::storage::HabitStorage;
use crate::tools::TrackerError;

/// Parameters for viewing a single day
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DayOverviewParams {
    /// Day to show (YYYY-MM-DD, optional - defaults to today)
    #[serde(default)]
    pub date: Option<String>,
}

/// Parameters for viewing a month
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CalendarParams {
    /// Year (optional - defaults to the current year)
    #[serde(default)]
    pub year: Option<i32>,
    /// Month 1-12 (optional - defaults to the current month)
    #[serde(default)]
    pub month: Option<u32>,
}

/// Parameters for the dashboard numbers (none)
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatsParams {}

/// Show which of the owner's habits applied to a day and which were done
pub fn day_overview<S: HabitStorage>(
    storage: &S,
    owner: &OwnerId,
    params: DayOverviewParams,
    today: NaiveDate,
) -> Result<DayOverview, TrackerError> {
    let day = match params.date.as_deref().map(str::trim) {
        None | Some("") => today,
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
            DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", text))
        })?,
    };

    if day > today {
        return Err(DomainError::InvalidDate("Cannot view days in the future".to_string()).into());
    }

    let habits = storage.list_habits(owner, true)?;
    Ok(DayOverview::build(&habits, day, today))
}

/// Summarize every day of a month for calendar display
pub fn month_calendar<S: HabitStorage>(
    storage: &S,
    owner: &OwnerId,
    params: CalendarParams,
    today: NaiveDate,
) -> Result<MonthCalendar, TrackerError> {
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());

    let habits = storage.list_habits(owner, true)?;
    Ok(MonthCalendar::build(&habits, year, month, today)?)
}

/// Totals shown at the top of the habit list
pub fn dashboard<S: HabitStorage>(
    storage: &S,
    owner: &OwnerId,
    _params: StatsParams,
    today: NaiveDate,
) -> Result<DashboardStats, TrackerError> {
    let habits = storage.list_habits(owner, true)?;
    Ok(DashboardStats::build(&habits, today))
}
