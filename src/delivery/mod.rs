pub mod banner;
pub mod bark;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;

pub use banner::BannerNotifier;
pub use bark::BarkNotifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    ExitStatus {
        program: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("push relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push relay answered {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid push relay url: {0}")]
    Url(String),
}

/// One way of getting a reminder in front of the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> &'static str;
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// The banner is always on; the push relay only when a device key is set.
pub fn channels_from_config(config: &AppConfig) -> Result<Vec<Arc<dyn Notifier>>, AppError> {
    let mut channels: Vec<Arc<dyn Notifier>> = vec![Arc::new(BannerNotifier)];

    match &config.bark {
        Some(bark) => channels.push(Arc::new(BarkNotifier::new(bark.clone())?)),
        None => info!("BARK_KEY not set, push notifications disabled"),
    }
    Ok(channels)
}
