use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use notification_worker::{
    clients::{
        email::{EmailChannel, EmailSettings, MailTransport, OutgoingMail, SmtpTarget},
        sms::{SmsApi, SmsChannel, SmsSettings},
    },
    error::DeliveryError,
    models::sms::{SendSmsRequest, SmsReceipt},
    worker::Dispatcher,
};

/// Records every submission; optionally fails them all.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<(SmtpTarget, OutgoingMail)>>>,
    failure: Option<String>,
}

impl RecordingTransport {
    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Arc::default(),
            failure: Some(reason.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<(SmtpTarget, OutgoingMail)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.calls().into_iter().map(|(_, mail)| mail).collect()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn submit(&self, target: &SmtpTarget, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        self.calls
            .lock()
            .unwrap()
            .push((target.clone(), mail.clone()));

        match &self.failure {
            Some(reason) => Err(DeliveryError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
pub enum SmsReply {
    Accept,
    Reject(String),
    Hang(Duration),
}

#[derive(Clone)]
pub struct ScriptedSmsApi {
    reply: SmsReply,
    calls: Arc<Mutex<Vec<(String, SendSmsRequest)>>>,
}

impl ScriptedSmsApi {
    pub fn new(reply: SmsReply) -> Self {
        Self {
            reply,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, SendSmsRequest)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsApi for ScriptedSmsApi {
    async fn send_sms(
        &self,
        api_key: &str,
        request: &SendSmsRequest,
    ) -> Result<SmsReceipt, DeliveryError> {
        self.calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.clone()));

        match &self.reply {
            SmsReply::Accept => Ok(SmsReceipt {
                status: 200,
                message: "SMS queued".to_string(),
            }),
            SmsReply::Reject(reason) => Err(DeliveryError::Transport(reason.clone())),
            SmsReply::Hang(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(SmsReceipt {
                    status: 200,
                    message: "late".to_string(),
                })
            }
        }
    }
}

pub fn smtp_settings() -> EmailSettings {
    EmailSettings {
        host: "smtp.example.com".to_string(),
        port: "587".to_string(),
        user: String::new(),
        from: "noreply@example.com".to_string(),
        password: "secret".to_string(),
    }
}

pub fn sms_settings() -> SmsSettings {
    SmsSettings {
        api_key: "sms-key".to_string(),
        sender_id: 1,
        base_url: "http://localhost".to_string(),
    }
}

pub fn dispatcher_with(
    email: EmailSettings,
    transport: RecordingTransport,
    sms: ScriptedSmsApi,
) -> Dispatcher<RecordingTransport, ScriptedSmsApi> {
    Dispatcher::new(
        EmailChannel::with_transport(email, transport),
        SmsChannel::with_api(sms_settings(), sms),
    )
}
