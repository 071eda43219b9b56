//! Pipeline Error Hierarchy
//!
//! Defines the error types for the buffering data plane, categorized by
//! subsystem: message codec, broker delivery, and sink routing.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Message envelope encode/decode failures
    #[error(transparent)]
    Messaging(#[from] MessagingError),

    /// Event broker dispatch and delivery failures
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Downstream sink routing and write failures
    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// Payload bytes shorter than the fixed wire size of the kind
    #[error("incomplete {kind} payload: expected {expected} bytes, received {actual} bytes")]
    IncompletePayload {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Payload tag not covered by any known kind
    #[error("unknown payload kind tag: {0}")]
    UnknownKind(i32),

    /// Serialization failures for event payloads
    #[error(transparent)]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Delivery target was never registered or already removed
    #[error("no dispatcher registered for id {0}")]
    UnknownDispatcher(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Dynamic topic rule failed validation
    #[error("invalid topic expression: {0}")]
    InvalidTopicExpression(String),

    /// Downstream system rejected a batch
    #[error("sink write failed: {0}")]
    WriteFailed(String),
}

// ============== Conversion Implementations ============== //
impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        MessagingError::Codec(err).into()
    }
}
