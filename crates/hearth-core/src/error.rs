//! Error types for Hearth core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Room is not present in the device directory
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    /// Device is not present in the given room
    #[error("unknown device: {room}/{device}")]
    UnknownDevice { room: String, device: String },

    /// Action is not permitted for the device
    #[error("action {action} not supported by {room}/{device}")]
    UnsupportedAction {
        room: String,
        device: String,
        action: String,
    },

    /// Topic string does not follow the gateway topic scheme
    #[error("invalid topic: {0}")]
    InvalidTopic(String),
}
