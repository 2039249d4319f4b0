//! Storage trait and error types

use crate::records::{CastMember, Movie};
use crate::storage::{CastRow, MovieRow, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Run {0} was already finished")]
    RunAlreadyFinished(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the relational store backing the pipeline
pub trait Storage {
    // ===== Run ledger =====

    /// Inserts a RUNNING ledger entry with zero counts and returns its id.
    fn create_run(&mut self) -> StorageResult<i64>;

    /// Finishes a RUNNING ledger entry exactly once: sets `finished_at`,
    /// the terminal status, the persisted row counts, and (for failures) a
    /// human-readable message.
    ///
    /// Finishing a run that is not RUNNING is an error; ledger entries are
    /// never revisited.
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        movie_rows: u64,
        cast_rows: u64,
        error_message: Option<&str>,
    ) -> StorageResult<()>;

    /// Gets a ledger entry by id
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent ledger entry
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    // ===== Chart data =====

    /// Upserts both batches inside a single transaction, keyed by
    /// `external_id` for movies and `(external_id, cast_order)` for cast.
    ///
    /// All-or-nothing: any row failure rolls the whole write back. Empty
    /// input is a `(0, 0)` no-op.
    fn upsert_chart(&mut self, movies: &[Movie], cast: &[CastMember]) -> StorageResult<(u64, u64)>;

    /// Gets a stored movie by natural key
    fn get_movie(&self, external_id: &str) -> StorageResult<Option<MovieRow>>;

    /// Gets a movie's stored cast, ordered by `cast_order`
    fn get_cast(&self, external_id: &str) -> StorageResult<Vec<CastRow>>;

    /// Total stored movie rows
    fn count_movies(&self) -> StorageResult<u64>;

    /// Total stored cast rows
    fn count_cast(&self) -> StorageResult<u64>;
}
