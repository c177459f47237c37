use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Alert, NotificationOutcome};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("sms delivery failed: {0}")]
    Sms(String),
    #[error("desktop notification failed: {0}")]
    Desktop(String),
}

/// A single delivery route for an availability alert.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AlertChannel: Send + Sync {
    async fn deliver(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Fans an alert out to the SMS and desktop channels. Each channel is tried
/// regardless of how the other one fared.
pub struct Notifier {
    sms: Arc<dyn AlertChannel>,
    desktop: Arc<dyn AlertChannel>,
}

impl Notifier {
    pub fn new(sms: Arc<dyn AlertChannel>, desktop: Arc<dyn AlertChannel>) -> Self {
        Self { sms, desktop }
    }

    pub async fn send_sms(&self, alert: &Alert) -> bool {
        match self.sms.deliver(alert).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(target: "notify", error = %err, "failed to send text notification");
                false
            }
        }
    }

    pub async fn send_desktop(&self, alert: &Alert) -> bool {
        match self.desktop.deliver(alert).await {
            Ok(()) => {
                tracing::info!(target: "notify", "desktop notification shown");
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: "notify",
                    error = %err,
                    "failed to show desktop notification"
                );
                false
            }
        }
    }

    pub async fn notify(&self, alert: &Alert) -> NotificationOutcome {
        let sms_sent = self.send_sms(alert).await;
        let desktop_sent = self.send_desktop(alert).await;
        let outcome = NotificationOutcome {
            sms_sent,
            desktop_sent,
        };
        tracing::info!(
            target: "notify",
            sms_sent,
            desktop_sent,
            delivered = outcome.delivered(),
            "notification round finished"
        );
        outcome
    }
}
