use anyhow::{Context, Result};
use reqwest::Response;
use serde::Deserialize;

use crate::config::TwilioConfig;

pub fn messages_url(api_base: &str, account_sid: &str) -> String {
    format!(
        "{}/Accounts/{account_sid}/Messages.json",
        api_base.trim_end_matches('/')
    )
}

pub fn build_form<'a>(config: &'a TwilioConfig, body: &'a str) -> [(&'static str, &'a str); 3] {
    [
        ("To", config.to_number.as_str()),
        ("MessagingServiceSid", config.messaging_service_sid.as_str()),
        ("Body", body),
    ]
}

pub async fn parse_response(response: Response) -> Result<String> {
    let status = response.status();
    let payload = response.text().await?;
    if !status.is_success() {
        let detail = serde_json::from_str::<ApiError>(&payload)
            .map(|err| err.to_string())
            .unwrap_or(payload);
        anyhow::bail!("Twilio API returned HTTP {}: {}", status.as_u16(), detail);
    }
    parse_message_sid(&payload)
}

pub fn parse_message_sid(payload: &str) -> Result<String> {
    let message: MessageResource =
        serde_json::from_str(payload).context("Twilio response was not a message resource")?;
    Ok(message.sid)
}

#[derive(Debug, Deserialize)]
pub struct MessageResource {
    pub sid: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<i64>,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}
