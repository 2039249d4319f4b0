//! Run ledger
//!
//! Every pipeline invocation appends exactly one run row: RUNNING at start,
//! then one terminal transition (SUCCESS or FAILED) that also records the
//! persisted row counts. The tracker owns its own storage handle so ledger
//! writes never contend with the data writes of the same run.

use crate::storage::{RunStatus, Storage, StorageResult};

/// Tracks one run's ledger entry from start to terminal state
pub struct RunTracker<S: Storage> {
    store: S,
}

impl<S: Storage> RunTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Opens a new RUNNING ledger entry and returns its id.
    pub fn start(&mut self) -> StorageResult<i64> {
        let run_id = self.store.create_run()?;
        tracing::info!("Run {} started", run_id);
        Ok(run_id)
    }

    /// Closes the entry as SUCCESS with the persisted counts.
    pub fn complete_success(
        &mut self,
        run_id: i64,
        movies_written: u64,
        cast_written: u64,
    ) -> StorageResult<()> {
        self.store
            .finish_run(run_id, RunStatus::Success, movies_written, cast_written, None)?;
        tracing::info!(
            "Run {} finished: {} movie rows, {} cast rows",
            run_id,
            movies_written,
            cast_written
        );
        Ok(())
    }

    /// Closes the entry as FAILED with a human-readable message. Nothing was
    /// persisted, so counts stay zero.
    pub fn complete_failure(&mut self, run_id: i64, message: &str) -> StorageResult<()> {
        self.store
            .finish_run(run_id, RunStatus::Failed, 0, 0, Some(message))?;
        tracing::error!("Run {} failed: {}", run_id, message);
        Ok(())
    }
}
