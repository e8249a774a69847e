/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, Completion, Streak) and their
/// validation rules. Nothing in here touches storage or I/O, so every piece
/// can be driven directly from tests with a fixed "now".

pub mod habit;
pub mod completion;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use completion::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid owner: {0}")]
    InvalidOwner(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
