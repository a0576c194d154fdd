use std::time::Duration;

use dotenvy::dotenv;
use serde::Deserialize;

use crate::{
    clients::{email::EmailSettings, sms::SmsSettings},
    error::ConfigError,
    models::retry::RetryPolicy,
};

/// Process configuration, loaded once at startup and never mutated.
///
/// Every field maps to the upper-cased environment variable of the same name
/// (`rabbitmq_url` <- `RABBITMQ_URL`). Delivery credentials default to empty
/// strings so a half-configured channel is reported per message instead of
/// refusing to start.
#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_rabbitmq_url")]
    pub rabbitmq_url: String,
    #[serde(default = "default_queue_name")]
    pub queue_name: String,
    #[serde(default = "default_connect_attempts")]
    pub broker_connect_attempts: u32,
    #[serde(default = "default_backoff_unit_ms")]
    pub broker_backoff_unit_ms: u64,

    #[serde(default)]
    pub smtp_host: String,
    #[serde(default)]
    pub smtp_port: String,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_from: String,
    #[serde(default)]
    pub smtp_password: String,

    #[serde(default)]
    pub sms_apikey: String,
    #[serde(default)]
    pub email_apikey: String,
    #[serde(default = "default_sms_sender_id")]
    pub sms_sender_id: u32,
    #[serde(default = "default_sms_base_url")]
    pub sms_base_url: String,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_rabbitmq_url() -> String {
    "amqp://localhost:5672".to_string()
}

fn default_queue_name() -> String {
    "email_queue".to_string()
}

fn default_connect_attempts() -> u32 {
    10
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_sms_sender_id() -> u32 {
    1
}

fn default_sms_base_url() -> String {
    "https://api.notify.africa/v2".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();

        Self::from_vars(std::env::vars())
    }

    /// Builds a config from explicit key/value pairs instead of the process
    /// environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Self>(vars)?)
    }

    pub fn reconnect_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.broker_connect_attempts,
            backoff_unit: Duration::from_millis(self.broker_backoff_unit_ms),
        }
    }

    pub fn email_settings(&self) -> EmailSettings {
        EmailSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port.clone(),
            user: self.smtp_user.clone(),
            from: self.smtp_from.clone(),
            password: self.smtp_password.clone(),
        }
    }

    pub fn sms_settings(&self) -> SmsSettings {
        SmsSettings {
            api_key: self.sms_apikey.clone(),
            sender_id: self.sms_sender_id,
            base_url: self.sms_base_url.clone(),
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}
