use std::{fmt, time::Duration};

use thiserror::Error;
use url::Url;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_WINDOW_BEFORE: usize = 100;
pub const DEFAULT_WINDOW_AFTER: usize = 300;
pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub course: CourseConfig,
    pub twilio: TwilioConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct CourseConfig {
    pub url: Url,
    pub code: String,
    pub check_interval: Duration,
    pub window: WindowPolicy,
}

/// How much text around a course code match is inspected, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub before: usize,
    pub after: usize,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            before: DEFAULT_WINDOW_BEFORE,
            after: DEFAULT_WINDOW_AFTER,
        }
    }
}

#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub messaging_service_sid: String,
    pub to_number: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("messaging_service_sid", &self.messaging_service_sid)
            .field("to_number", &self.to_number)
            .field("api_base", &self.api_base)
            .finish()
    }
}
