use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

const EMAIL_FIELDS: [&str; 3] = ["to", "subject", "body"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub to: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsRequest {
    pub number: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
}

/// Missing and `null` string fields both read as `""`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_sms_shaped(fields: &Map<String, Value>) -> bool {
    fields.get("number").is_some_and(Value::is_string)
        && !EMAIL_FIELDS.iter().any(|field| fields.contains_key(*field))
}

/// One decoded queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationRequest {
    Email(EmailRequest),
    Sms(SmsRequest),
}

impl NotificationRequest {
    /// Decodes a raw queue payload.
    ///
    /// Every payload is an email request unless it is an object with a
    /// string `number` and none of `to`, `subject` or `body`; only then is it
    /// an SMS request. Missing or `null` fields (and a bare `null` payload)
    /// read as empty strings. Unknown fields are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(payload)?;

        if value.is_null() {
            return Ok(Self::Email(EmailRequest::default()));
        }

        if value.as_object().is_some_and(is_sms_shaped) {
            Ok(Self::Sms(serde_json::from_value(value)?))
        } else {
            Ok(Self::Email(serde_json::from_value(value)?))
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Self::Email(request) => &request.to,
            Self::Sms(request) => &request.number,
        }
    }

    pub fn channel(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Sms(_) => "sms",
        }
    }
}
