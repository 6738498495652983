pub mod merge;
pub mod notifications;
pub mod scheduler;
pub mod sync_runner;
pub mod sync_service;

pub use merge::SyncStats;
pub use notifications::{NotificationReport, NotificationService};
pub use scheduler::SyncScheduler;
pub use sync_runner::{SyncFailure, SyncRunner, SyncStatus};
pub use sync_service::SyncService;
