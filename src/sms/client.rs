use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::TwilioConfig,
    domain::Alert,
    infrastructure::notifier::{AlertChannel, NotifyError},
};

use super::api::{build_form, messages_url, parse_response};

#[derive(Clone)]
pub struct TwilioClient {
    http: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(http: Client, config: TwilioConfig) -> Self {
        Self { http, config }
    }

    pub async fn send(&self, body: &str) -> anyhow::Result<String> {
        let response = self
            .http
            .post(messages_url(&self.config.api_base, &self.config.account_sid))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&build_form(&self.config, body)[..])
            .send()
            .await?;

        parse_response(response).await
    }
}

#[async_trait]
impl AlertChannel for TwilioClient {
    async fn deliver(&self, alert: &Alert) -> Result<(), NotifyError> {
        let sid = self
            .send(&alert.sms_text())
            .await
            .map_err(|err| NotifyError::Sms(format!("{err:#}")))?;
        tracing::info!(
            target: "notify",
            sid = %sid,
            to = %self.config.to_number,
            "text notification sent"
        );
        Ok(())
    }
}
