/// Public library interface for the Habit Tracker server
///
/// This module exports the server, the habit operations and the public types
/// that can be used by other applications or tests.

use std::path::PathBuf;
use thiserror::Error;

// Internal modules
mod domain;
mod storage;
pub mod analytics;
pub mod mcp;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use storage::{HabitStorage, SqliteStorage, StorageError};
pub use tools::TrackerError;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit tracker bound to one database and one verified owner
///
/// Every tool call made through this server acts on behalf of `owner`.
pub struct HabitTrackerServer {
    storage: SqliteStorage,
    owner: OwnerId,
}

impl HabitTrackerServer {
    /// Create a new habit tracker server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf, owner: OwnerId) -> Result<Self, ServerError> {
        tracing::info!(owner = %owner, "Initializing Habit Tracker server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        Ok(Self { storage, owner })
    }

    /// Create a server backed by a throwaway in-memory database
    pub fn in_memory(owner: OwnerId) -> Result<Self, ServerError> {
        Ok(Self {
            storage: SqliteStorage::in_memory()?,
            owner,
        })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        let habits = self.storage.list_habits(&self.owner, true)?;
        tracing::info!("Server started successfully, found {} active habits", habits.len());

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// The owner every operation acts for
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }
}
