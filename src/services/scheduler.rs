use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::error::AppError;
use crate::services::notifications::NotificationService;
use crate::services::sync_runner::SyncRunner;

/// Background check: sync with Canvas (when configured), then announce
/// whatever milestones fall on today.
pub struct SyncScheduler {
    sync: Option<Arc<SyncRunner>>,
    notifications: Arc<NotificationService>,
    interval: Option<Duration>,
}

impl SyncScheduler {
    /// `interval_secs == 0` runs the check once and stops.
    pub fn new(
        sync: Option<Arc<SyncRunner>>,
        notifications: Arc<NotificationService>,
        interval_secs: u64,
    ) -> Self {
        Self {
            sync,
            notifications,
            interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
        }
    }

    pub async fn start(self) {
        match self.interval {
            Some(interval) => info!("Starting auto-sync scheduler (interval: {:?})", interval),
            None => info!("Running startup sync"),
        }

        loop {
            self.tick(Local::now().date_naive()).await;

            match self.interval {
                Some(interval) => tokio::time::sleep(interval).await,
                None => break,
            }
        }
    }

    /// One sync-then-notify pass. Errors are logged; a failed sync does not
    /// prevent the notification check.
    pub async fn tick(&self, today: NaiveDate) {
        if let Some(sync) = &self.sync {
            match sync.run_exclusive(today).await {
                Ok(stats) => info!(
                    "Auto-sync completed - {} added, {} updated, {} removed",
                    stats.added, stats.updated, stats.removed
                ),
                Err(AppError::Conflict(_)) => info!("Auto-sync skipped, a sync is already running"),
                Err(e) => warn!("Auto-sync failed: {}", e),
            }
        }

        if let Err(e) = self.notifications.run(today).await {
            warn!("Notification check failed: {}", e);
        }
    }
}
