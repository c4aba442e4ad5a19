//! Inbound message routing
//!
//! One task owns the transport's delivery channel. Each inbound
//! payload is parsed as an acknowledgment and handed to the
//! correlation tracker; anything malformed is logged and dropped so
//! the delivery path can never be crashed or blocked by a bad device.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use hearth_core::ReplyMessage;
use hearth_transport::InboundMessage;

use crate::tracker::CorrelationTracker;

/// Routes acknowledgments from the transport to their waiters
pub struct MessageRouter {
    tracker: Arc<CorrelationTracker>,
}

impl MessageRouter {
    pub fn new(tracker: Arc<CorrelationTracker>) -> Self {
        Self { tracker }
    }

    /// Consume the delivery channel until the transport closes it
    pub fn spawn(self, mut rx: mpsc::Receiver<InboundMessage>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                self.handle(msg);
            }
            debug!("delivery channel closed, router stopping");
        })
    }

    fn handle(&self, msg: InboundMessage) {
        let reply: ReplyMessage = match serde_json::from_slice(&msg.payload) {
            Ok(reply) => reply,
            Err(e) => {
                // Missing correlation_id lands here too; either way
                // the message is not for us
                warn!("ignoring malformed message on '{}': {}", msg.topic, e);
                return;
            }
        };

        debug!(
            "acknowledgment for {} on '{}'",
            reply.correlation_id, msg.topic
        );
        self.tracker.complete(reply.correlation_id, reply);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use uuid::Uuid;

    fn msg(topic: &str, payload: &str) -> InboundMessage {
        InboundMessage {
            topic: topic.to_string(),
            payload: Bytes::copy_from_slice(payload.as_bytes()),
        }
    }

    #[tokio::test]
    async fn test_routes_matching_reply() {
        let tracker = Arc::new(CorrelationTracker::new());
        let router = MessageRouter::new(tracker.clone());
        let (tx, rx) = mpsc::channel(8);
        let handle = router.spawn(rx);

        let id = Uuid::new_v4();
        let pending = tracker.start(id).unwrap();

        tx.send(msg(
            "smarthome/livingroom/light/state",
            &format!(r#"{{"correlation_id":"{id}","state":"ON"}}"#),
        ))
        .await
        .unwrap();

        assert!(pending.wait().await);
        assert_eq!(tracker.take(id).unwrap().state, "ON");

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_payloads_are_dropped() {
        let tracker = Arc::new(CorrelationTracker::new());
        let router = MessageRouter::new(tracker.clone());
        let (tx, rx) = mpsc::channel(8);
        let handle = router.spawn(rx);

        let id = Uuid::new_v4();
        let pending = tracker.start(id).unwrap();

        // Not JSON, no correlation id, wrong schema: all ignored
        for payload in ["not json", r#"{"state":"ON"}"#, r#"{"correlation_id":42}"#] {
            tx.send(msg("smarthome/livingroom/light/state", payload))
                .await
                .unwrap();
        }
        // A good message afterwards still gets through
        tx.send(msg(
            "smarthome/livingroom/light/state",
            &format!(r#"{{"correlation_id":"{id}","state":"OFF"}}"#),
        ))
        .await
        .unwrap();

        assert!(pending.wait().await);
        assert_eq!(tracker.take(id).unwrap().state, "OFF");

        drop(tx);
        handle.await.unwrap();
    }
}
