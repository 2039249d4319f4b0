//! Database schema definitions
//!
//! All SQL schema for the Cinerank database. The schema is applied
//! idempotently on every open.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Ranked movie entries, one row per natural key
CREATE TABLE IF NOT EXISTS movies (
    external_id TEXT PRIMARY KEY,
    rank INTEGER NOT NULL CHECK (rank >= 1),
    title TEXT NOT NULL,
    release_year INTEGER,
    score REAL,
    source_url TEXT NOT NULL,
    observed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_movies_rank ON movies(rank);

-- Cast entries, dense 1..K order per movie
CREATE TABLE IF NOT EXISTS movie_cast (
    external_id TEXT NOT NULL,
    cast_order INTEGER NOT NULL CHECK (cast_order >= 1),
    name TEXT NOT NULL,
    role_label TEXT,
    profile_url TEXT,
    observed_at TEXT NOT NULL,
    PRIMARY KEY (external_id, cast_order)
);

CREATE INDEX IF NOT EXISTS idx_movie_cast_movie ON movie_cast(external_id);

-- Run ledger: one row per pipeline invocation, never revisited once finished
CREATE TABLE IF NOT EXISTS runs (
    run_id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    status TEXT NOT NULL,
    movie_rows INTEGER NOT NULL DEFAULT 0,
    cast_rows INTEGER NOT NULL DEFAULT 0,
    error_message TEXT
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
