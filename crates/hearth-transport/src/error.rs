//! Transport error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    #[error("unsubscribe failed: {0}")]
    UnsubscribeFailed(String),

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("not connected")]
    NotConnected,

    #[error("transport error: {0}")]
    Other(String),
}
