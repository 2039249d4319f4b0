//! Storage module for persisting chart data and the run ledger
//!
//! SQLite-backed implementation of the `Storage` trait: idempotent schema
//! application, transactional chart upserts, and the append-per-run ledger.

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{Storage, StorageError, StorageResult};

/// A stored movie row, as read back from the database
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRow {
    pub external_id: String,
    pub rank: u32,
    pub title: String,
    pub release_year: Option<i32>,
    pub score: Option<f64>,
    pub source_url: String,
    pub observed_at: String,
}

/// A stored cast row, as read back from the database
#[derive(Debug, Clone, PartialEq)]
pub struct CastRow {
    pub external_id: String,
    pub order: u32,
    pub name: String,
    pub role_label: Option<String>,
    pub profile_url: Option<String>,
    pub observed_at: String,
}

/// A run ledger entry
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: RunStatus,
    pub movie_rows: u64,
    pub cast_rows: u64,
    pub error_message: Option<String>,
}

/// Status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "RUNNING" => Some(Self::Running),
            "SUCCESS" => Some(Self::Success),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}
