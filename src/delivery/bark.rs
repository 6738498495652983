use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{DeliveryError, Notification, Notifier};
use crate::config::BarkConfig;
use crate::error::AppError;

const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Push relay for the Bark iOS app. Title and body travel as path segments.
pub struct BarkNotifier {
    client: Client,
    config: BarkConfig,
}

impl BarkNotifier {
    pub fn new(config: BarkConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for BarkNotifier {
    fn channel(&self) -> &'static str {
        "bark"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let url = push_url(&self.config.server, &self.config.key, notification)?;
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DeliveryError::Status(response.status()));
        }
        Ok(())
    }
}

/// `<server>/<key>/<title>/<message>?sound=default&group=HomeworkTracker`,
/// each segment percent-encoded on its own.
pub fn push_url(server: &str, key: &str, notification: &Notification) -> Result<Url, DeliveryError> {
    let mut url = Url::parse(server).map_err(|e| DeliveryError::Url(format!("{}: {}", server, e)))?;

    url.path_segments_mut()
        .map_err(|_| DeliveryError::Url(format!("{} cannot carry a path", server)))?
        .pop_if_empty()
        .extend([key, notification.title.as_str(), notification.message.as_str()]);
    url.query_pairs_mut()
        .append_pair("sound", "default")
        .append_pair("group", "HomeworkTracker");

    Ok(url)
}
