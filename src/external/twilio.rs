use super::SmsGateway;
use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SendSmsResponse {
    sid: String,
    status: String,
}

#[derive(Clone)]
pub struct TwilioService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsGateway for TwilioService {
    async fn send(&self, recipient: &str, message: &str) -> AppResult<()> {
        if self.config.account_sid.is_empty() || self.config.from_phone.is_empty() {
            return Err(AppError::ConfigError(
                "Twilio account_sid/from_phone are not configured".to_string(),
            ));
        }

        let params = [
            ("To", recipient),
            ("From", self.config.from_phone.as_str()),
            ("Body", message),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            match response.json::<SendSmsResponse>().await {
                Ok(sms) => log::info!(
                    "SMS sent successfully: to={}, sid={}, status={}",
                    recipient,
                    sms.sid,
                    sms.status
                ),
                Err(e) => log::warn!("SMS accepted for {recipient} but response unreadable: {e}"),
            }
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("SMS failed to send: {}, Error: {}", recipient, error_text);
            Err(AppError::ExternalApiError(format!(
                "SMS sending failed: {}",
                error_text
            )))
        }
    }
}
