//! Common test helpers and utilities for Hearth tests
//!
//! This crate provides:
//! - Condition-based waiting (no hardcoded sleeps)
//! - An in-memory mock transport with scripted failures
//! - A fully wired test gateway on top of it

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use hearth_core::{CommandMessage, DeviceDirectory};
use hearth_gateway::{Commander, CorrelationTracker, MessageRouter};
use hearth_transport::{
    InboundMessage, Result as TransportResult, SubscriptionTable, Transport, TransportError,
};

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Condition-Based Waiting
// ============================================================================

/// Wait for a condition with timeout - condition-based, not time-based
pub async fn wait_for<F>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check() {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    false
}

/// Wait until the mock transport has seen at least `count` publishes
pub async fn wait_for_publishes(transport: &MockTransport, count: usize) -> bool {
    wait_for(
        || transport.publish_count() >= count,
        DEFAULT_CHECK_INTERVAL,
        DEFAULT_TIMEOUT,
    )
    .await
}

// ============================================================================
// Mock Transport
// ============================================================================

/// In-memory transport double.
///
/// Records every publish and broker-level subscription transition,
/// reference counts topics exactly like the real transport, and lets
/// tests inject inbound messages and script call failures.
pub struct MockTransport {
    table: SubscriptionTable,
    published: Mutex<Vec<(String, Bytes)>>,
    active: Mutex<HashSet<String>>,
    broker_subscribes: Mutex<Vec<String>>,
    broker_unsubscribes: Mutex<Vec<String>>,
    fail_publish: AtomicBool,
    fail_subscribe: AtomicBool,
    inbound_tx: mpsc::Sender<InboundMessage>,
}

impl MockTransport {
    pub fn new() -> (Arc<Self>, mpsc::Receiver<InboundMessage>) {
        let (tx, rx) = mpsc::channel(64);
        let transport = Arc::new(Self {
            table: SubscriptionTable::new(),
            published: Mutex::new(Vec::new()),
            active: Mutex::new(HashSet::new()),
            broker_subscribes: Mutex::new(Vec::new()),
            broker_unsubscribes: Mutex::new(Vec::new()),
            fail_publish: AtomicBool::new(false),
            fail_subscribe: AtomicBool::new(false),
            inbound_tx: tx,
        });
        (transport, rx)
    }

    /// Deliver an inbound message as if the broker pushed it
    pub async fn inject(&self, topic: &str, payload: impl Into<Bytes>) {
        let msg = InboundMessage {
            topic: topic.to_string(),
            payload: payload.into(),
        };
        self.inbound_tx
            .send(msg)
            .await
            .expect("router dropped the delivery channel");
    }

    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_subscribe(&self, fail: bool) {
        self.fail_subscribe.store(fail, Ordering::SeqCst);
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().len()
    }

    pub fn published(&self) -> Vec<(String, Bytes)> {
        self.published.lock().clone()
    }

    /// Published payloads parsed as commands, with their topics
    pub fn published_commands(&self) -> Vec<(String, CommandMessage)> {
        self.published
            .lock()
            .iter()
            .filter_map(|(topic, payload)| {
                serde_json::from_slice(payload)
                    .ok()
                    .map(|cmd| (topic.clone(), cmd))
            })
            .collect()
    }

    /// Topics with a live broker-level subscription
    pub fn active_subscriptions(&self) -> Vec<String> {
        self.active.lock().iter().cloned().collect()
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.active.lock().contains(topic)
    }

    /// Broker SUBSCRIBE calls issued, in order
    pub fn broker_subscribes(&self) -> Vec<String> {
        self.broker_subscribes.lock().clone()
    }

    /// Broker UNSUBSCRIBE calls issued, in order
    pub fn broker_unsubscribes(&self) -> Vec<String> {
        self.broker_unsubscribes.lock().clone()
    }

    pub fn holder_count(&self, topic: &str) -> usize {
        self.table.count(topic)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn publish(&self, topic: &str, payload: Bytes) -> TransportResult<()> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(TransportError::PublishFailed("mock failure".to_string()));
        }
        self.published.lock().push((topic.to_string(), payload));
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> TransportResult<()> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(TransportError::SubscribeFailed("mock failure".to_string()));
        }
        if self.table.acquire(topic) {
            self.active.lock().insert(topic.to_string());
            self.broker_subscribes.lock().push(topic.to_string());
        }
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> TransportResult<()> {
        if self.table.release(topic) {
            self.active.lock().remove(topic);
            self.broker_unsubscribes.lock().push(topic.to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Test Gateway
// ============================================================================

/// A commander wired to the mock transport with a live router task
pub struct TestGateway {
    pub commander: Arc<Commander>,
    pub tracker: Arc<CorrelationTracker>,
    pub transport: Arc<MockTransport>,
    pub router: JoinHandle<()>,
}

impl TestGateway {
    /// Build a gateway over the default home directory.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(request_timeout: Duration) -> Self {
        let directory = Arc::new(DeviceDirectory::default_home());
        let (transport, inbound_rx) = MockTransport::new();
        let tracker = Arc::new(CorrelationTracker::new());
        let router = MessageRouter::new(tracker.clone()).spawn(inbound_rx);
        let commander = Arc::new(Commander::new(
            directory,
            transport.clone(),
            tracker.clone(),
            request_timeout,
        ));

        Self {
            commander,
            tracker,
            transport,
            router,
        }
    }
}

// ============================================================================
// Payload builders
// ============================================================================

/// JSON acknowledgment payload for a correlation id
pub fn ack_payload(correlation_id: Uuid, state: &str) -> Bytes {
    Bytes::from(
        serde_json::json!({
            "correlation_id": correlation_id,
            "state": state,
        })
        .to_string(),
    )
}

/// JSON device-error payload for a correlation id
pub fn error_payload(correlation_id: Uuid, code: &str, message: &str) -> Bytes {
    Bytes::from(
        serde_json::json!({
            "correlation_id": correlation_id,
            "state": "ERROR",
            "error_code": code,
            "error_message": message,
        })
        .to_string(),
    )
}
