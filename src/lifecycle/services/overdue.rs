//! Overdue sweep: bulk deadline enforcement.

use crate::lifecycle::ports::{TaskRepository, TaskRepositoryError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for the overdue sweep.
#[derive(Debug, Error)]
pub enum OverdueSweepError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Sweeps deadline-bearing tasks past their due date to overdue.
#[derive(Clone)]
pub struct OverdueSweeper<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> OverdueSweeper<R>
where
    R: TaskRepository,
{
    /// Creates a new overdue sweeper.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Runs the sweep as of `now`, returning the number of tasks
    /// transitioned.
    ///
    /// One bulk conditional update: no per-task branching and no
    /// notifications. Idempotent and monotonic, so overlapping ticks are
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns [`OverdueSweepError`] when the bulk update fails.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, OverdueSweepError> {
        Ok(self.repository.sweep_overdue(now).await?)
    }
}
