use std::sync::Arc;

use crate::services::SyncRunner;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    /// `None` when Canvas is not configured.
    pub sync: Option<Arc<SyncRunner>>,
}
