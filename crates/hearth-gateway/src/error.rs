//! Gateway error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request rejected by the device directory; no side effects occurred
    #[error("validation failed: {0}")]
    Validation(#[from] hearth_core::Error),

    /// Publish/subscribe call itself failed
    #[error("transport error: {0}")]
    Transport(#[from] hearth_transport::TransportError),

    /// No matching acknowledgment arrived within the deadline
    #[error("device did not respond in time")]
    GatewayTimeout,

    /// The device acknowledged with an explicit failure
    #[error("device reported failure: {code}: {message}")]
    DeviceReported { code: String, message: String },

    #[error("gateway error: {0}")]
    Internal(String),
}
