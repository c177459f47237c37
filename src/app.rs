use std::{panic::AssertUnwindSafe, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use futures::FutureExt;
use tokio::time::sleep;

use crate::{
    classifier::AvailabilityClassifier,
    config::AppConfig,
    domain::{Alert, Availability, Reason},
    infrastructure::{
        desktop::DesktopNotifier,
        logging,
        notifier::Notifier,
        shutdown::{install_signal_handlers, Shutdown, ShutdownListener},
    },
    sms::TwilioClient,
    web_content::{self, FetchError, PageFetcher, PageSource},
};

/// Pause after an unexpected failure before the next check.
pub const RECOVERY_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Checking,
    Waiting(Duration),
    Notifying,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Notified,
    Interrupted,
}

pub struct CourseWatch {
    source: Arc<dyn PageSource>,
    classifier: AvailabilityClassifier,
    notifier: Notifier,
    alert: Alert,
    course_code: String,
    poll_interval: Duration,
    recovery_interval: Duration,
}

impl CourseWatch {
    pub fn new(
        source: Arc<dyn PageSource>,
        classifier: AvailabilityClassifier,
        notifier: Notifier,
        course_code: &str,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            classifier,
            notifier,
            alert: Alert::course_available(course_code),
            course_code: course_code.to_string(),
            poll_interval,
            recovery_interval: RECOVERY_INTERVAL,
        }
    }

    /// Wires the production fetcher and delivery channels from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = web_content::build_client().context("failed to build HTTP client")?;
        let fetcher = PageFetcher::new(http.clone(), config.course.url.clone());
        let notifier = Notifier::new(
            Arc::new(TwilioClient::new(http, config.twilio.clone())),
            Arc::new(DesktopNotifier::new()),
        );
        let classifier = AvailabilityClassifier::new(&config.course.code, config.course.window);

        Ok(Self::new(
            Arc::new(fetcher),
            classifier,
            notifier,
            &config.course.code,
            config.course.check_interval,
        ))
    }

    #[cfg(test)]
    fn with_recovery_interval(mut self, interval: Duration) -> Self {
        self.recovery_interval = interval;
        self
    }

    /// One fetch + classify pass. Recoverable failures come back as
    /// `Waiting`; only unexpected failures are returned as errors.
    pub async fn check(&self) -> Result<MonitorState> {
        let page = match self.source.fetch().await {
            Ok(page) => page,
            Err(err @ FetchError::Timeout { .. }) => {
                tracing::warn!(target: "monitor", error = %err, "page fetch timed out");
                return Ok(MonitorState::Waiting(self.poll_interval));
            }
            Err(err) => {
                tracing::warn!(target: "monitor", error = %err, "page fetch failed");
                return Ok(MonitorState::Waiting(self.poll_interval));
            }
        };

        tracing::debug!(
            target: "monitor",
            status = page.status,
            bytes = page.body.len(),
            "classifying page"
        );
        let classifier = self.classifier.clone();
        let availability = tokio::task::spawn_blocking(move || classifier.classify_html(&page.body))
            .await
            .context("page classification task failed")?;
        tracing::debug!(
            target: "monitor",
            available = availability.is_available(),
            "page classified"
        );

        match availability {
            Availability::Available => {
                tracing::info!(
                    target: "monitor",
                    course = %self.course_code,
                    "course might be available, sending notifications"
                );
                Ok(MonitorState::Notifying)
            }
            Availability::Unavailable(Reason::CodeNotFound) => {
                tracing::warn!(
                    target: "monitor",
                    course = %self.course_code,
                    "course code missing from page, checking again later"
                );
                Ok(MonitorState::Waiting(self.poll_interval))
            }
            Availability::Unavailable(reason) => {
                tracing::info!(
                    target: "monitor",
                    course = %self.course_code,
                    %reason,
                    "still full, checking again later"
                );
                Ok(MonitorState::Waiting(self.poll_interval))
            }
        }
    }

    pub async fn notify(&self) -> MonitorState {
        let outcome = self.notifier.notify(&self.alert).await;
        if outcome.delivered() {
            MonitorState::Stopped
        } else {
            tracing::error!(
                target: "monitor",
                course = %self.course_code,
                "every notification channel failed, will retry on a later check"
            );
            MonitorState::Waiting(self.poll_interval)
        }
    }

    /// Advances the state machine by one transition. Errors and panics from
    /// the step fall back to the recovery interval.
    pub async fn step(&self, state: MonitorState) -> MonitorState {
        let attempt = async {
            match state {
                MonitorState::Checking => self.check().await,
                MonitorState::Notifying => Ok(self.notify().await),
                other => Ok(other),
            }
        };

        match AssertUnwindSafe(attempt).catch_unwind().await {
            Ok(Ok(next)) => next,
            Ok(Err(err)) => {
                tracing::error!(
                    target: "monitor",
                    error = ?err,
                    retry_in = ?self.recovery_interval,
                    "unexpected error during check"
                );
                MonitorState::Waiting(self.recovery_interval)
            }
            Err(panic) => {
                // Location and backtrace were logged by the panic hook.
                tracing::error!(
                    target: "monitor",
                    panic = %logging::panic_message(panic.as_ref()),
                    retry_in = ?self.recovery_interval,
                    "check panicked"
                );
                MonitorState::Waiting(self.recovery_interval)
            }
        }
    }

    pub async fn run(&self, mut shutdown: ShutdownListener) -> StopReason {
        tracing::info!(
            target: "monitor",
            course = %self.course_code,
            interval = ?self.poll_interval,
            "course monitor started"
        );

        let mut state = MonitorState::Checking;
        let mut cycle: u64 = 0;
        loop {
            if shutdown.is_triggered() {
                tracing::info!(target: "monitor", "stop requested, exiting");
                return StopReason::Interrupted;
            }

            state = match state {
                MonitorState::Checking => {
                    cycle += 1;
                    tracing::info!(target: "monitor", cycle, "checking course page");
                    self.step(state).await
                }
                MonitorState::Notifying => self.step(state).await,
                MonitorState::Waiting(interval) => {
                    tokio::select! {
                        _ = sleep(interval) => MonitorState::Checking,
                        _ = shutdown.notified() => {
                            tracing::info!(target: "monitor", "stop requested while waiting");
                            return StopReason::Interrupted;
                        }
                    }
                }
                MonitorState::Stopped => {
                    tracing::info!(
                        target: "monitor",
                        course = %self.course_code,
                        cycles = cycle,
                        "notification delivered, monitor stopped"
                    );
                    return StopReason::Notified;
                }
            };
        }
    }
}

/// Builds the monitor, hooks up signal handling and runs until the course
/// opens or the operator stops the process.
pub async fn run(config: AppConfig) -> Result<StopReason> {
    let (shutdown, _) = Shutdown::new();
    install_signal_handlers(shutdown.clone());

    let watch = CourseWatch::from_config(&config)?;
    Ok(watch.run(shutdown.subscribe()).await)
}
