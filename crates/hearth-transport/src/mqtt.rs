//! MQTT transport
//!
//! rumqttc-backed implementation of [`Transport`]. Owns the broker
//! connection and its event loop; every message arriving on a
//! subscribed topic is forwarded over the inbound channel handed out
//! at connect time. Broker subscriptions are reference counted so
//! concurrent requests sharing a topic cannot tear each other down.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{Result, TransportError};
use crate::subscriptions::SubscriptionTable;
use crate::traits::{InboundMessage, Transport};

/// MQTT transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    /// MQTT broker host (e.g., "localhost")
    pub broker_host: String,
    /// MQTT broker port
    pub broker_port: u16,
    /// Client ID for the broker connection
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Optional username for authentication
    #[serde(default)]
    pub username: Option<String>,
    /// Optional password for authentication
    #[serde(default)]
    pub password: Option<String>,
    /// QoS level (0, 1, or 2)
    #[serde(default = "default_qos")]
    pub qos: u8,
    /// Keep alive interval in seconds
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u16,
    /// Capacity of the inbound delivery channel
    #[serde(default = "default_capacity")]
    pub channel_capacity: usize,
}

fn default_client_id() -> String {
    format!(
        "hearth-{}",
        uuid::Uuid::new_v4().to_string().split('-').next().unwrap()
    )
}

fn default_qos() -> u8 {
    1
}

fn default_keep_alive() -> u16 {
    60
}

fn default_capacity() -> usize {
    100
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: default_client_id(),
            username: None,
            password: None,
            qos: default_qos(),
            keep_alive_secs: default_keep_alive(),
            channel_capacity: default_capacity(),
        }
    }
}

/// MQTT-backed transport
pub struct MqttTransport {
    client: AsyncClient,
    subscriptions: SubscriptionTable,
    qos: QoS,
    running: Arc<Mutex<bool>>,
}

impl MqttTransport {
    /// Connect to the broker and start the event loop.
    ///
    /// Returns the transport plus the receiver end of the inbound
    /// delivery channel. The connection itself is established lazily
    /// by the event loop; failures there are logged and retried.
    pub fn connect(config: MqttConfig) -> (Self, mpsc::Receiver<InboundMessage>) {
        let mut options = MqttOptions::new(
            &config.client_id,
            &config.broker_host,
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs as u64));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            options.set_credentials(user, pass);
        }

        let (client, mut eventloop) = AsyncClient::new(options, config.channel_capacity);
        let (tx, rx) = mpsc::channel(config.channel_capacity);

        let running = Arc::new(Mutex::new(true));
        let running_loop = running.clone();

        info!(
            "MQTT transport connecting to {}:{}",
            config.broker_host, config.broker_port
        );

        tokio::spawn(async move {
            loop {
                if !*running_loop.lock() {
                    break;
                }

                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        debug!(
                            "MQTT received on '{}' ({} bytes)",
                            publish.topic,
                            publish.payload.len()
                        );
                        let msg = InboundMessage {
                            topic: publish.topic,
                            payload: publish.payload,
                        };
                        if tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        info!("MQTT connected to broker");
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        warn!("MQTT disconnected from broker");
                    }
                    Err(e) => {
                        error!("MQTT error: {:?}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                    _ => {}
                }
            }
        });

        let transport = Self {
            client,
            subscriptions: SubscriptionTable::new(),
            qos: parse_qos(config.qos),
            running,
        };

        (transport, rx)
    }

    /// Stop the event loop and disconnect from the broker
    pub async fn disconnect(&self) {
        *self.running.lock() = false;
        let _ = self.client.disconnect().await;
        info!("MQTT transport stopped");
    }

    fn ensure_running(&self) -> Result<()> {
        if *self.running.lock() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

#[async_trait]
impl Transport for MqttTransport {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        self.ensure_running()?;

        self.client
            .publish(topic, self.qos, false, payload)
            .await
            .map_err(|e| TransportError::PublishFailed(e.to_string()))?;

        debug!("MQTT published to '{}'", topic);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.ensure_running()?;

        if self.subscriptions.acquire(topic) {
            if let Err(e) = self.client.subscribe(topic, self.qos).await {
                // Roll the count back so a retry issues the broker call again
                self.subscriptions.release(topic);
                return Err(TransportError::SubscribeFailed(e.to_string()));
            }
            debug!("MQTT subscribed to '{}'", topic);
        }
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<()> {
        if self.subscriptions.release(topic) {
            self.client
                .unsubscribe(topic)
                .await
                .map_err(|e| TransportError::UnsubscribeFailed(e.to_string()))?;
            debug!("MQTT unsubscribed from '{}'", topic);
        }
        Ok(())
    }
}

fn parse_qos(qos: u8) -> QoS {
    match qos {
        0 => QoS::AtMostOnce,
        1 => QoS::AtLeastOnce,
        _ => QoS::ExactlyOnce,
    }
}
