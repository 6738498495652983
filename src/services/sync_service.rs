use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::canvas::CanvasClient;
use crate::error::AppError;
use crate::services::merge::{self, SyncStats};
use crate::store::Store;

pub struct SyncService {
    store: Arc<Store>,
    canvas: Arc<dyn CanvasClient>,
}

impl SyncService {
    pub fn new(store: Arc<Store>, canvas: Arc<dyn CanvasClient>) -> Self {
        Self { store, canvas }
    }

    /// Pulls a Canvas snapshot and reconciles it into the store. The snapshot
    /// is fetched before the store gate is taken; if fetching fails the store
    /// is not touched.
    pub async fn sync_all(&self, today: NaiveDate) -> Result<SyncStats, AppError> {
        info!("Starting sync...");

        info!("Step 1: Fetching assignments from Canvas");
        let snapshot = self.canvas.fetch_snapshot(today).await?;

        info!("Step 2: Reconciling with {}", self.store.path().display());
        let stats = self
            .store
            .update(|doc| {
                let existing = std::mem::take(&mut doc.assignments);
                let (merged, stats) = merge::reconcile(existing, &snapshot);
                doc.assignments = merged;
                Ok(stats)
            })
            .await?;

        info!(
            "Sync complete: {} added, {} updated, {} removed, {} auto-completed across {} courses",
            stats.added, stats.updated, stats.removed, stats.auto_completed, stats.courses_seen
        );
        Ok(stats)
    }
}
