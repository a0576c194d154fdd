use lapin::{
    Channel, Connection, ConnectionProperties, Consumer,
    options::{BasicConsumeOptions, QueueDeclareOptions},
    types::FieldTable,
};
use tracing::info;

use crate::{
    config::Config, error::BrokerError, models::retry::RetryPolicy,
    utils::retry_with_linear_backoff,
};

const CONSUMER_TAG: &str = "notification_worker";

/// Dials the broker at `config.rabbitmq_url`, retrying with linear backoff.
pub async fn connect(config: &Config) -> Result<Connection, BrokerError> {
    let url = config.rabbitmq_url.as_str();

    info!("Connecting to RabbitMQ...");

    connect_with(&config.reconnect_policy(), || {
        Connection::connect(url, ConnectionProperties::default())
    })
    .await
}

/// Retry driver behind [`connect`], generic over the dial operation.
pub async fn connect_with<F, Fut, C, E>(policy: &RetryPolicy, dial: F) -> Result<C, BrokerError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<C, E>>,
    E: std::fmt::Display,
{
    let connection = retry_with_linear_backoff(policy, dial)
        .await
        .map_err(|e| BrokerError::Connection {
            attempts: policy.max_attempts.max(1),
            reason: e.to_string(),
        })?;

    info!("RabbitMQ connection established");

    Ok(connection)
}

/// Owns the broker connection and the one channel the worker consumes on.
pub struct RabbitMqClient {
    _connection: Connection,
    channel: Channel,
    queue_name: String,
}

impl RabbitMqClient {
    pub async fn open(connection: Connection, queue_name: &str) -> Result<Self, BrokerError> {
        let channel = connection
            .create_channel()
            .await
            .map_err(BrokerError::Channel)?;

        info!("RabbitMQ channel created");

        Ok(Self {
            _connection: connection,
            channel,
            queue_name: queue_name.to_string(),
        })
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Declares the work queue durable, shared and persistent. Redeclaring
    /// with the same properties is a no-op on the broker.
    pub async fn declare_queue(&self) -> Result<(), BrokerError> {
        let queue = self
            .channel
            .queue_declare(
                &self.queue_name,
                QueueDeclareOptions {
                    durable: true,
                    exclusive: false,
                    auto_delete: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|source| BrokerError::Declare {
                queue: self.queue_name.clone(),
                source,
            })?;

        info!(
            queue = %self.queue_name,
            messages = queue.message_count(),
            consumers = queue.consumer_count(),
            "Queue declared"
        );

        Ok(())
    }

    /// Registers an auto-ack consumer: the broker forgets a message as soon as
    /// it is handed to us, whatever the delivery outcome.
    pub async fn create_consumer(&self) -> Result<Consumer, BrokerError> {
        let consumer = self
            .channel
            .basic_consume(
                &self.queue_name,
                CONSUMER_TAG,
                BasicConsumeOptions {
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|source| BrokerError::ConsumeRegistration {
                queue: self.queue_name.clone(),
                source,
            })?;

        info!(queue = %self.queue_name, "Consumer registered");

        Ok(consumer)
    }
}
