use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::timeout;
use tracing::{error, info};

use crate::{
    error::DeliveryError,
    models::sms::{SendSmsRequest, SmsReceipt},
};

pub const SMS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default)]
pub struct SmsSettings {
    pub api_key: String,
    pub sender_id: u32,
    pub base_url: String,
}

#[async_trait]
pub trait SmsApi: Send + Sync {
    async fn send_sms(
        &self,
        api_key: &str,
        request: &SendSmsRequest,
    ) -> Result<SmsReceipt, DeliveryError>;
}

/// HTTP client for the Notify Africa SMS API.
#[derive(Debug, Clone)]
pub struct NotifyAfricaClient {
    http_client: Client,
    base_url: String,
}

impl NotifyAfricaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SmsApi for NotifyAfricaClient {
    async fn send_sms(
        &self,
        api_key: &str,
        request: &SendSmsRequest,
    ) -> Result<SmsReceipt, DeliveryError> {
        let url = format!("{}/send-sms", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(format!("SMS request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Transport(format!(
                "SMS API returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        response
            .json::<SmsReceipt>()
            .await
            .map_err(|e| DeliveryError::Transport(format!("invalid SMS API response: {e}")))
    }
}

pub struct SmsChannel<A = NotifyAfricaClient> {
    api_key: String,
    sender_id: u32,
    api: A,
    timeout: Duration,
}

impl SmsChannel<NotifyAfricaClient> {
    pub fn new(settings: SmsSettings) -> Self {
        let api = NotifyAfricaClient::new(&settings.base_url);
        Self::with_api(settings, api)
    }
}

impl<A: SmsApi> SmsChannel<A> {
    pub fn with_api(settings: SmsSettings, api: A) -> Self {
        Self {
            api_key: settings.api_key,
            sender_id: settings.sender_id,
            api,
            timeout: SMS_TIMEOUT,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Sends `message` to `number`, bounded by [`SMS_TIMEOUT`].
    pub async fn send(&self, number: &str, message: &str) -> Result<SmsReceipt, DeliveryError> {
        if !self.is_configured() {
            return Err(DeliveryError::Config("missing SMS_APIKEY".to_string()));
        }

        let request = SendSmsRequest::immediate(self.sender_id, message, number);

        let receipt = match timeout(self.timeout, self.api.send_sms(&self.api_key, &request)).await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                error!(number, error = %e, "SMS send failed");
                return Err(e);
            }
            Err(_) => {
                error!(number, timeout_ms = self.timeout.as_millis() as u64, "SMS send timed out");
                return Err(DeliveryError::Timeout(self.timeout));
            }
        };

        info!(
            number,
            status = receipt.status,
            message = %receipt.message,
            "SMS sent"
        );

        Ok(receipt)
    }
}
