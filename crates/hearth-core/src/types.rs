//! Wire payload definitions
//!
//! Payloads are JSON on the wire. The command format is fixed by the
//! device firmware: `value` is always present, `null` when the action
//! carries no argument. Replies carry whatever extra fields a device
//! chooses to report (sensor readings, units), preserved verbatim for
//! the caller.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ERROR_STATE;

/// Command published to a device's command topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMessage {
    pub action: String,
    /// Argument for actions like SET_TEMP; serialized as `null` when absent
    pub value: Option<i64>,
    pub correlation_id: Uuid,
}

impl CommandMessage {
    pub fn new(action: &str, value: Option<i64>, correlation_id: Uuid) -> Self {
        Self {
            action: action.to_string(),
            value,
            correlation_id,
        }
    }
}

/// Acknowledgment received on a device's state topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub correlation_id: Uuid,
    /// Resulting device state, or `"ERROR"` on failure
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Device-specific fields passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ReplyMessage {
    /// True when the device explicitly reported a failure
    pub fn is_error(&self) -> bool {
        self.state == ERROR_STATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serializes_null_value() {
        let id = Uuid::new_v4();
        let cmd = CommandMessage::new("ON", None, id);
        let json = serde_json::to_value(&cmd).unwrap();

        // Firmware expects the key present even without an argument
        assert_eq!(json["action"], "ON");
        assert!(json["value"].is_null());
        assert_eq!(json["correlation_id"], id.to_string());
    }

    #[test]
    fn test_command_with_value() {
        let cmd = CommandMessage::new("SET_TEMP", Some(24), Uuid::new_v4());
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"value\":24"));
    }

    #[test]
    fn test_reply_minimal() {
        let id = Uuid::new_v4();
        let raw = format!(r#"{{"correlation_id":"{id}","state":"ON"}}"#);
        let reply: ReplyMessage = serde_json::from_str(&raw).unwrap();

        assert_eq!(reply.correlation_id, id);
        assert_eq!(reply.state, "ON");
        assert!(!reply.is_error());
        assert!(reply.extra.is_empty());
    }

    #[test]
    fn test_reply_error_fields() {
        let raw = format!(
            r#"{{"correlation_id":"{}","state":"ERROR","error_code":"E1","error_message":"stuck"}}"#,
            Uuid::new_v4()
        );
        let reply: ReplyMessage = serde_json::from_str(&raw).unwrap();

        assert!(reply.is_error());
        assert_eq!(reply.error_code.as_deref(), Some("E1"));
        assert_eq!(reply.error_message.as_deref(), Some("stuck"));
    }

    #[test]
    fn test_reply_preserves_extra_fields() {
        let raw = format!(
            r#"{{"correlation_id":"{}","state":"ON","value":21.5,"unit":"C","rssi":-61}}"#,
            Uuid::new_v4()
        );
        let reply: ReplyMessage = serde_json::from_str(&raw).unwrap();

        assert_eq!(reply.value, Some(21.5));
        assert_eq!(reply.unit.as_deref(), Some("C"));
        assert_eq!(reply.extra["rssi"], -61);

        let back = serde_json::to_value(&reply).unwrap();
        assert_eq!(back["rssi"], -61);
    }

    #[test]
    fn test_reply_missing_correlation_id_rejected() {
        assert!(serde_json::from_str::<ReplyMessage>(r#"{"state":"ON"}"#).is_err());
    }
}
