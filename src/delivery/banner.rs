use async_trait::async_trait;
use tokio::process::Command;

use super::{DeliveryError, Notification, Notifier};

/// Desktop banner: `osascript` on macOS, `notify-send` elsewhere.
pub struct BannerNotifier;

#[async_trait]
impl Notifier for BannerNotifier {
    fn channel(&self) -> &'static str {
        "banner"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let (program, args) = banner_command(notification);
        let output = Command::new(program)
            .args(&args)
            .output()
            .await
            .map_err(|source| DeliveryError::Spawn { program, source })?;

        if !output.status.success() {
            return Err(DeliveryError::ExitStatus {
                program,
                status: output.status,
            });
        }
        Ok(())
    }
}

pub fn banner_command(notification: &Notification) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("osascript", vec!["-e".to_string(), applescript(notification)])
    } else {
        (
            "notify-send",
            vec![
                "--app-name=Homework Tracker".to_string(),
                notification.title.clone(),
                notification.message.clone(),
            ],
        )
    }
}

fn applescript(notification: &Notification) -> String {
    format!(
        r#"display notification "{}" with title "{}" sound name "Default""#,
        escape(&notification.message),
        escape(&notification.title)
    )
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
