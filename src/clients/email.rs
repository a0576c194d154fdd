use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{error, info};

use crate::error::DeliveryError;

/// SMTP credentials and endpoint. Empty strings mean "not configured".
#[derive(Debug, Clone, Default)]
pub struct EmailSettings {
    pub host: String,
    pub port: String,
    pub user: String,
    pub from: String,
    pub password: String,
}

impl EmailSettings {
    fn missing(&self) -> Vec<&'static str> {
        [
            ("SMTP_FROM", &self.from),
            ("SMTP_PASSWORD", &self.password),
            ("SMTP_HOST", &self.host),
            ("SMTP_PORT", &self.port),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Login identity for the SMTP server; falls back to the sender address.
    pub fn login(&self) -> &str {
        if self.user.trim().is_empty() {
            &self.from
        } else {
            &self.user
        }
    }
}

/// Where and as whom a message is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// A plain-text message ready for submission: `From`, `To` and `Subject`
/// headers followed by the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn submit(&self, target: &SmtpTarget, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

/// Authenticated SMTP submission over STARTTLS through `lettre`.
#[derive(Debug, Clone, Default)]
pub struct SmtpTransport;

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn submit(&self, target: &SmtpTarget, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let from: Mailbox = mail
            .from
            .parse()
            .map_err(|e| DeliveryError::Transport(format!("invalid sender address: {e}")))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|e| DeliveryError::Transport(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| DeliveryError::Transport(format!("failed to build message: {e}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&target.host)
            .map_err(|e| DeliveryError::Transport(format!("failed to create SMTP relay: {e}")))?
            .port(target.port)
            .credentials(Credentials::new(
                target.username.clone(),
                target.password.clone(),
            ))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| DeliveryError::Transport(format!("SMTP send failed: {e}")))?;

        Ok(())
    }
}

pub struct EmailChannel<T = SmtpTransport> {
    settings: EmailSettings,
    transport: T,
}

impl EmailChannel<SmtpTransport> {
    pub fn new(settings: EmailSettings) -> Self {
        Self::with_transport(settings, SmtpTransport)
    }
}

impl<T: MailTransport> EmailChannel<T> {
    pub fn with_transport(settings: EmailSettings, transport: T) -> Self {
        Self { settings, transport }
    }

    /// Sends one plain-text email.
    ///
    /// Fails with [`DeliveryError::Config`] before touching the network when
    /// the sender, password, host or port is missing.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let missing = self.settings.missing();
        if !missing.is_empty() {
            return Err(DeliveryError::Config(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        let port = self.settings.port.trim().parse::<u16>().map_err(|_| {
            DeliveryError::Config(format!("invalid SMTP_PORT {:?}", self.settings.port))
        })?;

        let target = SmtpTarget {
            host: self.settings.host.clone(),
            port,
            username: self.settings.login().to_string(),
            password: self.settings.password.clone(),
        };

        let mail = OutgoingMail {
            from: self.settings.from.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        if let Err(e) = self.transport.submit(&target, &mail).await {
            error!(recipient = %to, host = %target.host, port, error = %e, "Email transport failed");
            return Err(e);
        }

        info!(recipient = %to, "Email sent");

        Ok(())
    }
}
