//! SQLite storage implementation

use crate::records::{CastMember, Movie};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{CastRow, MovieRow, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Rows per prepared-statement batch. Chunk boundaries are invisible to the
/// atomicity contract; everything still commits in one transaction.
const WRITE_CHUNK: usize = 500;

const UPSERT_MOVIE_SQL: &str = "
    INSERT INTO movies (external_id, rank, title, release_year, score, source_url, observed_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT(external_id) DO UPDATE SET
        rank = excluded.rank,
        title = excluded.title,
        release_year = excluded.release_year,
        score = excluded.score,
        source_url = excluded.source_url,
        observed_at = excluded.observed_at";

const UPSERT_CAST_SQL: &str = "
    INSERT INTO movie_cast (external_id, cast_order, name, role_label, profile_url, observed_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT(external_id, cast_order) DO UPDATE SET
        name = excluded.name,
        role_label = excluded.role_label,
        profile_url = excluded.profile_url,
        observed_at = excluded.observed_at";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn read_run(&self, run_id: i64) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, started_at, finished_at, status, movie_rows, cast_rows, error_message
             FROM runs WHERE run_id = ?1",
        )?;

        let run = stmt
            .query_row(params![run_id], map_run_record)
            .optional()?;

        Ok(run)
    }
}

impl Storage for SqliteStore {
    // ===== Run ledger =====

    fn create_run(&mut self) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, status, movie_rows, cast_rows) VALUES (?1, ?2, 0, 0)",
            params![now, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        movie_rows: u64,
        cast_rows: u64,
        error_message: Option<&str>,
    ) -> StorageResult<()> {
        debug_assert!(status != RunStatus::Running);

        let now = Utc::now().to_rfc3339();
        // The status guard makes the transition exactly-once: a finished run
        // never matches again.
        let updated = self.conn.execute(
            "UPDATE runs
             SET finished_at = ?1, status = ?2, movie_rows = ?3, cast_rows = ?4, error_message = ?5
             WHERE run_id = ?6 AND status = ?7",
            params![
                now,
                status.to_db_string(),
                movie_rows as i64,
                cast_rows as i64,
                error_message,
                run_id,
                RunStatus::Running.to_db_string(),
            ],
        )?;

        if updated == 1 {
            return Ok(());
        }

        match self.read_run(run_id)? {
            Some(_) => Err(StorageError::RunAlreadyFinished(run_id)),
            None => Err(StorageError::RunNotFound(run_id)),
        }
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.read_run(run_id)?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, started_at, finished_at, status, movie_rows, cast_rows, error_message
             FROM runs ORDER BY run_id DESC LIMIT 1",
        )?;

        let run = stmt.query_row([], map_run_record).optional()?;

        Ok(run)
    }

    // ===== Chart data =====

    fn upsert_chart(&mut self, movies: &[Movie], cast: &[CastMember]) -> StorageResult<(u64, u64)> {
        if movies.is_empty() && cast.is_empty() {
            return Ok((0, 0));
        }

        // One timestamp for the whole write; re-runs overwrite it.
        let observed_at = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        let mut movie_rows = 0u64;
        for chunk in movies.chunks(WRITE_CHUNK) {
            let mut stmt = tx.prepare_cached(UPSERT_MOVIE_SQL)?;
            for movie in chunk {
                stmt.execute(params![
                    movie.external_id,
                    movie.rank,
                    movie.title,
                    movie.release_year,
                    movie.score,
                    movie.source_url,
                    observed_at,
                ])?;
                movie_rows += 1;
            }
        }

        let mut cast_rows = 0u64;
        for chunk in cast.chunks(WRITE_CHUNK) {
            let mut stmt = tx.prepare_cached(UPSERT_CAST_SQL)?;
            for member in chunk {
                stmt.execute(params![
                    member.external_id,
                    member.order,
                    member.name,
                    member.role_label,
                    member.profile_url,
                    observed_at,
                ])?;
                cast_rows += 1;
            }
        }

        tx.commit()?;
        Ok((movie_rows, cast_rows))
    }

    fn get_movie(&self, external_id: &str) -> StorageResult<Option<MovieRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT external_id, rank, title, release_year, score, source_url, observed_at
             FROM movies WHERE external_id = ?1",
        )?;

        let movie = stmt
            .query_row(params![external_id], |row| {
                Ok(MovieRow {
                    external_id: row.get(0)?,
                    rank: row.get(1)?,
                    title: row.get(2)?,
                    release_year: row.get(3)?,
                    score: row.get(4)?,
                    source_url: row.get(5)?,
                    observed_at: row.get(6)?,
                })
            })
            .optional()?;

        Ok(movie)
    }

    fn get_cast(&self, external_id: &str) -> StorageResult<Vec<CastRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT external_id, cast_order, name, role_label, profile_url, observed_at
             FROM movie_cast WHERE external_id = ?1 ORDER BY cast_order",
        )?;

        let cast = stmt
            .query_map(params![external_id], |row| {
                Ok(CastRow {
                    external_id: row.get(0)?,
                    order: row.get(1)?,
                    name: row.get(2)?,
                    role_label: row.get(3)?,
                    profile_url: row.get(4)?,
                    observed_at: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cast)
    }

    fn count_movies(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_cast(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM movie_cast", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn map_run_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
    let status_text: String = row.get(3)?;
    let status = RunStatus::from_db_string(&status_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown run status '{status_text}'").into(),
        )
    })?;

    Ok(RunRecord {
        run_id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        status,
        movie_rows: row.get::<_, i64>(4)? as u64,
        cast_rows: row.get::<_, i64>(5)? as u64,
        error_message: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, rank: u32, title: &str) -> Movie {
        Movie {
            external_id: id.to_string(),
            rank,
            title: title.to_string(),
            release_year: Some(1994),
            score: Some(9.3),
            source_url: format!("https://charts.example.com/title/{id}/"),
        }
    }

    fn cast_member(id: &str, order: u32, name: &str) -> CastMember {
        CastMember {
            external_id: id.to_string(),
            order,
            name: name.to_string(),
            role_label: Some("Lead".to_string()),
            profile_url: None,
        }
    }

    #[test]
    fn test_create_run_starts_running_with_zero_counts() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run().unwrap();
        assert!(run_id > 0);

        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.movie_rows, 0);
        assert_eq!(run.cast_rows, 0);
        assert!(run.finished_at.is_none());
        assert!(run.error_message.is_none());
    }

    #[test]
    fn test_run_ids_increase() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let first = store.create_run().unwrap();
        let second = store.create_run().unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_finish_run_success() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run().unwrap();
        store
            .finish_run(run_id, RunStatus::Success, 10, 42, None)
            .unwrap();

        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Success);
        assert_eq!(run.movie_rows, 10);
        assert_eq!(run.cast_rows, 42);
        assert!(run.finished_at.is_some());
        assert!(run.error_message.is_none());
    }

    #[test]
    fn test_finish_run_failure_records_message() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run().unwrap();
        store
            .finish_run(run_id, RunStatus::Failed, 0, 0, Some("listing page blocked"))
            .unwrap();

        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error_message.as_deref(), Some("listing page blocked"));
    }

    #[test]
    fn test_finish_run_is_exactly_once() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run().unwrap();
        store
            .finish_run(run_id, RunStatus::Success, 1, 1, None)
            .unwrap();

        let second = store.finish_run(run_id, RunStatus::Failed, 0, 0, Some("late"));
        assert!(matches!(
            second,
            Err(StorageError::RunAlreadyFinished(id)) if id == run_id
        ));

        // First transition stands.
        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Success);
    }

    #[test]
    fn test_finish_unknown_run() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let result = store.finish_run(999, RunStatus::Success, 0, 0, None);
        assert!(matches!(result, Err(StorageError::RunNotFound(999))));
    }

    #[test]
    fn test_corrupt_status_string_is_an_error() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let run_id = store.create_run().unwrap();
        store
            .conn
            .execute(
                "UPDATE runs SET status = 'DONE' WHERE run_id = ?1",
                params![run_id],
            )
            .unwrap();

        // A status outside the known set must not read back as RUNNING,
        // which would make the run look finishable again.
        assert!(matches!(
            store.get_run(run_id),
            Err(StorageError::Sqlite(_))
        ));
    }

    #[test]
    fn test_get_latest_run() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        assert!(store.get_latest_run().unwrap().is_none());

        store.create_run().unwrap();
        let second = store.create_run().unwrap();
        assert_eq!(store.get_latest_run().unwrap().unwrap().run_id, second);
    }

    #[test]
    fn test_upsert_empty_is_noop() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        assert_eq!(store.upsert_chart(&[], &[]).unwrap(), (0, 0));
        assert_eq!(store.count_movies().unwrap(), 0);
    }

    #[test]
    fn test_upsert_inserts_rows() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let written = store
            .upsert_chart(
                &[movie("tt0000001", 1, "First"), movie("tt0000002", 2, "Second")],
                &[
                    cast_member("tt0000001", 1, "Actor A"),
                    cast_member("tt0000001", 2, "Actor B"),
                ],
            )
            .unwrap();

        assert_eq!(written, (2, 2));
        assert_eq!(store.count_movies().unwrap(), 2);
        assert_eq!(store.count_cast().unwrap(), 2);
    }

    #[test]
    fn test_upsert_overwrites_on_same_key() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .upsert_chart(&[movie("tt0000001", 1, "Old Title")], &[])
            .unwrap();

        let mut updated = movie("tt0000001", 3, "New Title");
        updated.score = Some(8.8);
        store.upsert_chart(&[updated], &[]).unwrap();

        assert_eq!(store.count_movies().unwrap(), 1);
        let stored = store.get_movie("tt0000001").unwrap().unwrap();
        assert_eq!(stored.title, "New Title");
        assert_eq!(stored.rank, 3);
        assert_eq!(stored.score, Some(8.8));
    }

    #[test]
    fn test_upsert_cast_overwrites_on_composite_key() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .upsert_chart(&[], &[cast_member("tt0000001", 1, "Original")])
            .unwrap();

        let mut updated = cast_member("tt0000001", 1, "Recast");
        updated.role_label = Some("Different Role".to_string());
        store.upsert_chart(&[], &[updated]).unwrap();

        assert_eq!(store.count_cast().unwrap(), 1);
        let stored = store.get_cast("tt0000001").unwrap();
        assert_eq!(stored[0].name, "Recast");
        assert_eq!(stored[0].role_label.as_deref(), Some("Different Role"));
    }

    #[test]
    fn test_failed_cast_batch_rolls_back_movie_batch() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        // cast_order 0 violates the schema check mid-transaction.
        let bad = CastMember {
            external_id: "tt0000001".to_string(),
            order: 0,
            name: "Invalid".to_string(),
            role_label: None,
            profile_url: None,
        };

        let result = store.upsert_chart(
            &[movie("tt0000001", 1, "Doomed")],
            &[cast_member("tt0000001", 1, "Fine"), bad],
        );

        assert!(result.is_err());
        assert_eq!(store.count_movies().unwrap(), 0);
        assert_eq!(store.count_cast().unwrap(), 0);
    }

    #[test]
    fn test_get_cast_ordered() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .upsert_chart(
                &[],
                &[
                    cast_member("tt0000001", 2, "Second"),
                    cast_member("tt0000001", 1, "First"),
                ],
            )
            .unwrap();

        let stored = store.get_cast("tt0000001").unwrap();
        let orders: Vec<u32> = stored.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }
}
