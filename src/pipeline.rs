//! Pipeline orchestration
//!
//! Wires the stages together for one run: open a ledger entry, extract with a
//! browser session, normalize, upsert, and close the entry with the persisted
//! counts. The ledger entry opens before the browser session so every fatal
//! error after it, including a failed session connect, lands a terminal
//! FAILED transition; the session is released on every exit path once it
//! exists.

use crate::config::Config;
use crate::extract::Extractor;
use crate::ledger::RunTracker;
use crate::session::{BrowserSession, WebDriverSession};
use crate::storage::{SqliteStore, Storage};
use crate::{normalize, CinerankError, Result};
use std::path::Path;
use std::time::Duration;

/// Summary of one completed run
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    pub run_id: i64,
    pub movies_written: u64,
    pub cast_written: u64,
}

/// Runs the full pipeline against a remote WebDriver endpoint.
pub async fn run_pipeline(config: &Config) -> Result<RunOutcome> {
    let db_path = Path::new(&config.store.database_path);
    let (mut tracker, run_id) = open_run(db_path)?;

    let session = match WebDriverSession::connect(
        &config.webdriver.endpoint,
        Duration::from_secs(config.webdriver.page_load_timeout_secs),
    )
    .await
    {
        Ok(session) => session,
        Err(e) => {
            let e = CinerankError::from(e);
            record_failure(&mut tracker, run_id, &e);
            return Err(e);
        }
    };

    run_to_completion(config, session, db_path, &mut tracker, run_id).await
}

/// Pipeline core, generic over the browser session so tests can substitute a
/// scripted one. The session is already live here; it is released even when
/// the ledger entry fails to open.
pub async fn run_pipeline_with_session<S: BrowserSession>(
    config: &Config,
    session: S,
) -> Result<RunOutcome> {
    let db_path = Path::new(&config.store.database_path);
    let (mut tracker, run_id) = match open_run(db_path) {
        Ok(opened) => opened,
        Err(e) => {
            release(session).await;
            return Err(e);
        }
    };

    run_to_completion(config, session, db_path, &mut tracker, run_id).await
}

/// Opens the run's ledger entry before anything else can fail.
fn open_run(db_path: &Path) -> Result<(RunTracker<SqliteStore>, i64)> {
    let mut tracker = RunTracker::new(SqliteStore::open(db_path)?);
    let run_id = tracker.start()?;
    Ok((tracker, run_id))
}

async fn run_to_completion<S: BrowserSession>(
    config: &Config,
    session: S,
    db_path: &Path,
    tracker: &mut RunTracker<SqliteStore>,
    run_id: i64,
) -> Result<RunOutcome> {
    match harvest(config, session, db_path).await {
        Ok((movies_written, cast_written)) => {
            tracker.complete_success(run_id, movies_written, cast_written)?;
            Ok(RunOutcome {
                run_id,
                movies_written,
                cast_written,
            })
        }
        Err(e) => {
            record_failure(tracker, run_id, &e);
            Err(e)
        }
    }
}

/// Records the fatal error in the ledger. A failed ledger write is logged
/// and swallowed so the triggering error stays the one callers see.
fn record_failure(tracker: &mut RunTracker<SqliteStore>, run_id: i64, error: &CinerankError) {
    if let Err(ledger_err) = tracker.complete_failure(run_id, &error.to_string()) {
        tracing::error!(
            "Failed to record run {} failure in the ledger: {}",
            run_id,
            ledger_err
        );
    }
}

/// Extract, normalize, and persist. The session is released on every exit
/// path before the result propagates.
async fn harvest<S: BrowserSession>(
    config: &Config,
    mut session: S,
    db_path: &Path,
) -> Result<(u64, u64)> {
    let extractor = Extractor::new(config.harvest.clone());
    let extracted = extractor.run(&mut session).await;

    release(session).await;

    let (raw_movies, raw_cast) = extracted?;
    let (movies, cast) = normalize::normalize(raw_movies, raw_cast);

    let mut store = SqliteStore::open(db_path)?;
    let (movies_written, cast_written) = store.upsert_chart(&movies, &cast)?;

    Ok((movies_written, cast_written))
}

async fn release<S: BrowserSession>(session: S) {
    if let Err(e) = session.close().await {
        tracing::warn!("Failed to release browser session: {}", e);
    }
}
