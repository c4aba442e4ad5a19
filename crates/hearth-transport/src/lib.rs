//! Hearth Transport Layer
//!
//! Pub/sub transport for the Hearth gateway:
//! - The [`Transport`] trait the gateway talks through
//! - Reference-counted topic subscriptions ([`SubscriptionTable`])
//! - The MQTT implementation ([`MqttTransport`], rumqttc)

pub mod error;
pub mod mqtt;
pub mod subscriptions;
pub mod traits;

pub use error::{Result, TransportError};
pub use mqtt::{MqttConfig, MqttTransport};
pub use subscriptions::SubscriptionTable;
pub use traits::{InboundMessage, Transport};
