//! Request orchestration
//!
//! Drives one device command through its full lifecycle: validate,
//! subscribe, publish, await the acknowledgment, interpret it, and
//! release the subscription. The subscription is taken before the
//! command goes out so a fast device cannot reply into the void, and
//! it is released on every exit path.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use hearth_core::{CommandMessage, DeviceDirectory, DeviceTopic, ReplyMessage};
use hearth_transport::Transport;

use crate::error::{GatewayError, Result};
use crate::tracker::CorrelationTracker;

/// Executes device commands against the transport
pub struct Commander {
    directory: Arc<DeviceDirectory>,
    transport: Arc<dyn Transport>,
    tracker: Arc<CorrelationTracker>,
    request_timeout: Duration,
}

impl Commander {
    pub fn new(
        directory: Arc<DeviceDirectory>,
        transport: Arc<dyn Transport>,
        tracker: Arc<CorrelationTracker>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            transport,
            tracker,
            request_timeout,
        }
    }

    pub fn directory(&self) -> &DeviceDirectory {
        &self.directory
    }

    /// Run one command to completion.
    ///
    /// Validation failures return before anything touches the
    /// transport or the tracker. Once the state topic is subscribed it
    /// is released again no matter how the exchange ends.
    pub async fn execute(
        &self,
        room: &str,
        device: &str,
        action: &str,
        value: Option<i64>,
    ) -> Result<ReplyMessage> {
        self.directory.validate(room, device, action)?;

        let topic = DeviceTopic::new(room, device);
        let state_topic = topic.state();

        // Subscribe first: a reply published before the subscription
        // is active would be lost
        self.transport.subscribe(&state_topic).await?;

        let outcome = self.exchange(&topic, action, value).await;

        if let Err(e) = self.transport.unsubscribe(&state_topic).await {
            warn!("failed to release subscription on '{}': {}", state_topic, e);
        }

        outcome
    }

    async fn exchange(
        &self,
        topic: &DeviceTopic,
        action: &str,
        value: Option<i64>,
    ) -> Result<ReplyMessage> {
        let correlation_id = Uuid::new_v4();
        let pending = self.tracker.start(correlation_id)?;

        let command = CommandMessage::new(action, value, correlation_id);
        let payload = serde_json::to_vec(&command)
            .map_err(|e| GatewayError::Internal(format!("encode command: {e}")))?;

        info!("{} {} -> {}", topic, action, correlation_id);

        if let Err(e) = self.transport.publish(&topic.command(), Bytes::from(payload)).await {
            self.tracker.expire(correlation_id);
            return Err(e.into());
        }

        match timeout(self.request_timeout, pending.wait()).await {
            Ok(true) => {
                let reply = self.tracker.take(correlation_id).ok_or_else(|| {
                    GatewayError::Internal(format!(
                        "signalled request {correlation_id} had no staged reply"
                    ))
                })?;
                self.interpret(reply)
            }
            // Waiter dropped without a signal, or the deadline passed.
            // Expire so a straggling acknowledgment stays a no-op.
            Ok(false) | Err(_) => {
                self.tracker.expire(correlation_id);
                debug!("request {} timed out on {}", correlation_id, topic);
                Err(GatewayError::GatewayTimeout)
            }
        }
    }

    fn interpret(&self, reply: ReplyMessage) -> Result<ReplyMessage> {
        if reply.is_error() {
            return Err(GatewayError::DeviceReported {
                code: reply.error_code.unwrap_or_else(|| "UNKNOWN".to_string()),
                message: reply.error_message.unwrap_or_default(),
            });
        }
        Ok(reply)
    }
}
