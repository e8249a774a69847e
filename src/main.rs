/// Main entry point for the Habit Tracker server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout; logs go to stderr.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use habit_tracker::{HabitTrackerServer, OwnerId};

/// Whether a file can be created in `dir`
fn is_writable(dir: &Path) -> bool {
    let probe = dir.join(".write_probe");
    let ok = std::fs::write(&probe, b"").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}

/// Pick a database location, falling back through the usual user directories
fn get_default_database_path() -> Result<PathBuf, std::io::Error> {
    let candidates = [
        dirs::home_dir().map(|p| p.join(".habit_tracker")),
        dirs::data_dir().map(|p| p.join("habit_tracker")),
        dirs::config_dir().map(|p| p.join("habit_tracker")),
        std::env::current_dir().ok().map(|p| p.join(".habit_tracker")),
    ];

    for dir in candidates.iter().flatten() {
        if std::fs::create_dir_all(dir).is_ok() && is_writable(dir) {
            return Ok(dir.join("habits.db"));
        }
    }

    let temp_dir = std::env::temp_dir().join("habit_tracker");
    std::fs::create_dir_all(&temp_dir)?;
    warn!("Using temporary directory for database: {}", temp_dir.display());
    Ok(temp_dir.join("habits.db"))
}

/// Command line arguments for the Habit Tracker server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Identity of the user the host has already authenticated
    #[arg(long, default_value = "local")]
    owner: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_tracker={}", log_level))
        .with_writer(std::io::stderr) // stdout carries protocol traffic
        .init();

    info!("Starting Habit Tracker server");

    let owner = OwnerId::new(args.owner)?;

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let server = HabitTrackerServer::new(db_path, owner).await?;
    server.run().await?;

    info!("Habit Tracker server shutdown complete");
    Ok(())
}
