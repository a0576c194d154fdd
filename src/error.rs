use std::time::Duration;

use thiserror::Error;

/// Failures of a single delivery attempt. Always recovered inside the
/// consumer loop: the message is logged and dropped.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("channel configuration incomplete: {0}")]
    Config(String),

    #[error("transport failed: {0}")]
    Transport(String),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// A queue payload that could not be turned into a request.
#[derive(Debug, Error)]
#[error("malformed notification payload: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Broker setup failures. The worker cannot run without a channel, a
/// declared queue and a registered consumer, so all of these are fatal.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("failed to connect to broker after {attempts} attempts: {reason}")]
    Connection { attempts: u32, reason: String },

    #[error("failed to open broker channel: {0}")]
    Channel(#[source] lapin::Error),

    #[error("failed to declare queue {queue}: {source}")]
    Declare {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("failed to register consumer on {queue}: {source}")]
    ConsumeRegistration {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("delivery stream for {0} closed")]
    StreamClosed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Environment(#[from] envy::Error),
}
