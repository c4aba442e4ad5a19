//! Gateway configuration

use serde::{Deserialize, Serialize};

use hearth_core::{DEFAULT_BROKER_PORT, DEFAULT_REQUEST_TIMEOUT_SECS};
use hearth_transport::MqttConfig;

/// Process-wide gateway configuration, read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// MQTT broker host
    #[serde(default = "default_broker_host")]
    pub broker_host: String,
    /// MQTT broker port
    #[serde(default = "default_broker_port")]
    pub broker_port: u16,
    /// Seconds to wait for a device acknowledgment
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Bind address for the HTTP API
    #[serde(default = "default_http_bind")]
    pub http_bind: String,
}

fn default_broker_host() -> String {
    "localhost".to_string()
}

fn default_broker_port() -> u16 {
    DEFAULT_BROKER_PORT
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_http_bind() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            broker_host: default_broker_host(),
            broker_port: default_broker_port(),
            request_timeout_secs: default_request_timeout(),
            http_bind: default_http_bind(),
        }
    }
}

impl GatewayConfig {
    /// Transport configuration derived from the broker settings
    pub fn mqtt(&self) -> MqttConfig {
        MqttConfig {
            broker_host: self.broker_host.clone(),
            broker_port: self.broker_port,
            ..MqttConfig::default()
        }
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
