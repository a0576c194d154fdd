//! The consumption-and-delivery loop.
//!
//! Messages are consumed with automatic acknowledgment: the broker drops a
//! message the moment it reaches this worker. Each message then gets exactly
//! one best-effort delivery attempt. Failures are logged and the message is
//! lost; nothing is retried, requeued or dead-lettered.

use std::pin::pin;

use futures_util::{Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    clients::{
        email::{EmailChannel, MailTransport, SmtpTransport},
        health::WorkerStatus,
        rbmq::{self, RabbitMqClient},
        sms::{NotifyAfricaClient, SmsApi, SmsChannel},
    },
    config::Config,
    error::{BrokerError, DecodeError, DeliveryError},
    models::{health::MessageCounters, message::NotificationRequest, status::WorkerState},
};

/// Result of handling one queue message.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered {
        channel: &'static str,
        recipient: String,
    },
    Malformed(DecodeError),
    Failed {
        channel: &'static str,
        recipient: String,
        error: DeliveryError,
    },
}

/// Routes decoded requests to their delivery channel.
pub struct Dispatcher<T = SmtpTransport, A = NotifyAfricaClient> {
    email: EmailChannel<T>,
    sms: SmsChannel<A>,
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EmailChannel::new(config.email_settings()),
            SmsChannel::new(config.sms_settings()),
        )
    }
}

impl<T: MailTransport, A: SmsApi> Dispatcher<T, A> {
    pub fn new(email: EmailChannel<T>, sms: SmsChannel<A>) -> Self {
        Self { email, sms }
    }

    pub async fn dispatch(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        match request {
            NotificationRequest::Email(email) => {
                self.email
                    .send(&email.to, &email.subject, &email.body)
                    .await
            }
            NotificationRequest::Sms(sms) => {
                self.sms.send(&sms.number, &sms.message).await.map(|_| ())
            }
        }
    }
}

/// Decodes one payload and makes a single delivery attempt.
pub async fn process_payload<T, A>(payload: &[u8], dispatcher: &Dispatcher<T, A>) -> DeliveryOutcome
where
    T: MailTransport,
    A: SmsApi,
{
    let request = match NotificationRequest::decode(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, bytes = payload.len(), "Invalid message, skipping");
            return DeliveryOutcome::Malformed(e);
        }
    };

    let channel = request.channel();
    let recipient = request.recipient().to_string();

    info!(channel, recipient = %recipient, "Delivering notification");

    match dispatcher.dispatch(&request).await {
        Ok(()) => {
            info!(channel, recipient = %recipient, "Notification delivered");
            DeliveryOutcome::Delivered { channel, recipient }
        }
        Err(e) => {
            error!(channel, recipient = %recipient, error = %e, "Notification delivery failed");
            DeliveryOutcome::Failed {
                channel,
                recipient,
                error: e,
            }
        }
    }
}

/// Drains `deliveries` one message at a time until the stream ends.
///
/// Per-message errors never escape; errors yielded by the stream itself are
/// logged and reading continues. Returns the counts for this run.
pub async fn consume<S, E, T, A>(
    deliveries: S,
    dispatcher: &Dispatcher<T, A>,
    status: &WorkerStatus,
) -> MessageCounters
where
    S: Stream<Item = Result<Vec<u8>, E>>,
    E: std::fmt::Display,
    T: MailTransport,
    A: SmsApi,
{
    let mut deliveries = pin!(deliveries);
    let mut counters = MessageCounters::default();

    while let Some(delivery) = deliveries.next().await {
        let payload = match delivery {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Consumer stream error");
                continue;
            }
        };

        counters.received += 1;
        status.record_received();

        match process_payload(&payload, dispatcher).await {
            DeliveryOutcome::Delivered { .. } => {
                counters.delivered += 1;
                status.record_delivered();
            }
            DeliveryOutcome::Malformed(_) => {
                counters.malformed += 1;
                status.record_malformed();
            }
            DeliveryOutcome::Failed { .. } => {
                counters.failed += 1;
                status.record_failed();
            }
        }
    }

    counters
}

/// Connects, declares the queue and consumes until the broker goes away.
///
/// Only returns with an error: either a setup failure or
/// [`BrokerError::StreamClosed`] once the delivery stream ends. The caller
/// decides whether to exit.
pub async fn run<T, A>(
    config: &Config,
    dispatcher: &Dispatcher<T, A>,
    status: &WorkerStatus,
) -> Result<(), BrokerError>
where
    T: MailTransport,
    A: SmsApi,
{
    let result = run_until_closed(config, dispatcher, status).await;
    status.transition(WorkerState::Terminated);
    result
}

async fn run_until_closed<T, A>(
    config: &Config,
    dispatcher: &Dispatcher<T, A>,
    status: &WorkerStatus,
) -> Result<(), BrokerError>
where
    T: MailTransport,
    A: SmsApi,
{
    status.transition(WorkerState::Connecting);
    let connection = rbmq::connect(config).await?;
    status.transition(WorkerState::Connected);

    let client = RabbitMqClient::open(connection, &config.queue_name).await?;

    status.transition(WorkerState::DeclaringQueue);
    client.declare_queue().await?;

    let consumer = client.create_consumer().await?;
    status.transition(WorkerState::Consuming);

    info!(queue = %client.queue_name(), "Waiting for messages...");

    let deliveries = consumer.map(|delivery| delivery.map(|delivery| delivery.data));
    let counters = consume(deliveries, dispatcher, status).await;

    warn!(
        queue = %client.queue_name(),
        received = counters.received,
        delivered = counters.delivered,
        failed = counters.failed,
        malformed = counters.malformed,
        "Delivery stream closed"
    );

    Err(BrokerError::StreamClosed(client.queue_name().to_string()))
}
