use std::time::Duration;

use async_trait::async_trait;
use notify_rust::{Notification, Timeout};

use crate::{
    domain::Alert,
    infrastructure::notifier::{AlertChannel, NotifyError},
};

pub const DISPLAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Local OS notification popup.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
    timeout: Duration,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            timeout: DISPLAY_TIMEOUT,
        }
    }

    fn show(&self, alert: &Alert) -> Result<(), notify_rust::error::Error> {
        Notification::new()
            .appname(&self.app_name)
            .summary(&alert.title)
            .body(&alert.body)
            .timeout(Timeout::Milliseconds(self.timeout.as_millis() as u32))
            .show()?;
        Ok(())
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertChannel for DesktopNotifier {
    async fn deliver(&self, alert: &Alert) -> Result<(), NotifyError> {
        let notifier = self.clone();
        let alert = alert.clone();
        // The platform backends block on D-Bus / the notification center.
        tokio::task::spawn_blocking(move || notifier.show(&alert))
            .await
            .map_err(|err| NotifyError::Desktop(format!("notification task failed: {err}")))?
            .map_err(|err| NotifyError::Desktop(err.to_string()))
    }
}
