//! # Query Context
//!
//! Per-request correlation id and optional deadline, threaded through every
//! database call.
//!
//! ## Deadline Coverage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QueryContext::with_timeout(500ms)                                      │
//! │       │                                                                 │
//! │       ├── checkout   (pool.acquire)      ┐                              │
//! │       ├── BEGIN                          │  each step bounded by the    │
//! │       ├── statement 1..n                 │  same absolute deadline      │
//! │       └── COMMIT                         ┘                              │
//! │                                                                         │
//! │  expired → DbError::Timeout { stage }; an open transaction is rolled    │
//! │  back before the error is returned                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Request-scoped execution context. Cheap to copy.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext {
    request_id: Uuid,
    deadline: Option<Instant>,
}

impl QueryContext {
    /// A context without a deadline.
    pub fn new() -> Self {
        QueryContext {
            request_id: Uuid::new_v4(),
            deadline: None,
        }
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        QueryContext::new().deadline_at(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        QueryContext::new().deadline_at(deadline)
    }

    fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[inline]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    /// Runs one database step under this context's deadline.
    ///
    /// An already-expired context fails before `fut` is polled, so no work
    /// starts after the deadline.
    pub(crate) async fn run<F, T, E>(&self, stage: &str, fut: F) -> DbResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<DbError>,
    {
        let Some(deadline) = self.deadline else {
            return fut.await.map_err(Into::into);
        };

        if Instant::now() >= deadline {
            warn!(request_id = %self.request_id, stage, "Deadline already passed");
            return Err(DbError::timeout(stage));
        }

        match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => {
                warn!(request_id = %self.request_id, stage, "Deadline exceeded");
                Err(DbError::timeout(stage))
            }
        }
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        QueryContext::new()
    }
}
