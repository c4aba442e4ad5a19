//! Hearth Core
//!
//! Core types and protocol primitives for the Hearth smart-home gateway.
//!
//! This crate provides:
//! - Command and reply wire payloads ([`CommandMessage`], [`ReplyMessage`])
//! - The per-device topic scheme ([`DeviceTopic`])
//! - The device capability directory ([`DeviceDirectory`])
//! - Validation error types ([`Error`])

pub mod error;
pub mod registry;
pub mod topic;
pub mod types;

pub use error::{Error, Result};
pub use registry::{DeviceDirectory, DeviceKind, DeviceSpec};
pub use topic::{DeviceTopic, TopicKind};
pub use types::{CommandMessage, ReplyMessage};

/// Topic namespace shared by the gateway and the device firmware
pub const TOPIC_NAMESPACE: &str = "smarthome";

/// Default MQTT broker port
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Default request timeout in seconds.
///
/// Curtain-style devices take about six seconds of physical travel to
/// acknowledge, so the window is wider than a typical RPC deadline.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 8;

/// Reply state value signalling a device-reported failure
pub const ERROR_STATE: &str = "ERROR";
