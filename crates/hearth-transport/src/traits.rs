//! Transport trait definitions

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// A message delivered on a subscribed topic
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Bytes,
}

/// Pub/sub transport the gateway talks through.
///
/// Subscriptions are reference counted per topic: many concurrent
/// requests may depend on the same topic, and the broker-level
/// subscription is held until the last of them releases it. Inbound
/// messages are delivered out of band over the channel returned at
/// connect time.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fire-and-forget publish
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()>;

    /// Acquire a topic; subscribes at the broker on the first acquisition
    async fn subscribe(&self, topic: &str) -> Result<()>;

    /// Release a topic; unsubscribes at the broker when the last
    /// holder releases. Releasing an unheld topic is a no-op.
    async fn unsubscribe(&self, topic: &str) -> Result<()>;
}
