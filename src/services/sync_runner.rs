//! Single-flight wrapper around [`SyncService`].
//!
//! At most one sync runs at a time. A request that arrives while one is in
//! flight is refused with [`AppError::Conflict`] instead of being queued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::services::merge::SyncStats;
use crate::services::sync_service::SyncService;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    pub running: bool,
    pub last_sync: Option<DateTime<Local>>,
    pub result: Option<SyncStats>,
    pub error: Option<SyncFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub kind: String,
    pub message: String,
}

impl From<&AppError> for SyncFailure {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

pub struct SyncRunner {
    service: SyncService,
    status: Mutex<SyncStatus>,
}

impl SyncRunner {
    pub fn new(service: SyncService) -> Self {
        Self {
            service,
            status: Mutex::new(SyncStatus::default()),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.lock_status().clone()
    }

    /// Runs a sync on the current task.
    pub async fn run_exclusive(self: &Arc<Self>, today: NaiveDate) -> Result<SyncStats, AppError> {
        let permit = self.begin()?;
        let result = self.service.sync_all(today).await;
        permit.finish(&result);
        result
    }

    /// Starts a sync in the background and returns immediately.
    pub fn trigger(self: &Arc<Self>, today: NaiveDate) -> Result<(), AppError> {
        let permit = self.begin()?;
        let runner = Arc::clone(self);

        tokio::spawn(async move {
            let result = runner.service.sync_all(today).await;
            if let Err(e) = &result {
                warn!("Background sync failed: {}", e);
            }
            permit.finish(&result);
        });
        Ok(())
    }

    fn begin(self: &Arc<Self>) -> Result<SyncPermit, AppError> {
        let mut status = self.lock_status();
        if status.running {
            info!("Sync requested while another is running");
            return Err(AppError::Conflict("a sync is already running".to_string()));
        }
        status.running = true;

        Ok(SyncPermit {
            runner: Arc::clone(self),
        })
    }

    fn lock_status(&self) -> MutexGuard<'_, SyncStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held for the duration of one sync; releases the gate when dropped, even if
/// the sync task panics.
struct SyncPermit {
    runner: Arc<SyncRunner>,
}

impl SyncPermit {
    fn finish(self, result: &Result<SyncStats, AppError>) {
        let mut status = self.runner.lock_status();
        match result {
            Ok(stats) => {
                status.last_sync = Some(Local::now());
                status.result = Some(stats.clone());
                status.error = None;
            }
            Err(e) => status.error = Some(SyncFailure::from(e)),
        }
    }
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        self.runner.lock_status().running = false;
    }
}
