use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct SmsRecipient {
    pub number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendSmsRequest {
    pub sender_id: u32,
    pub sms: String,
    pub schedule: String,
    pub recipients: Vec<SmsRecipient>,
}

impl SendSmsRequest {
    pub fn immediate(sender_id: u32, message: &str, number: &str) -> Self {
        Self {
            sender_id,
            sms: message.to_string(),
            schedule: "none".to_string(),
            recipients: vec![SmsRecipient {
                number: number.to_string(),
            }],
        }
    }
}

/// Provider confirmation, surfaced to the caller for logging.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SmsReceipt {
    pub status: i64,

    #[serde(default)]
    pub message: String,
}
