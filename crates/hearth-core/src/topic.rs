//! Per-device topic scheme
//!
//! Commands go out on `smarthome/{room}/{device}/command` and devices
//! acknowledge on `smarthome/{room}/{device}/state`. Both sides of a
//! request are derived from one [`DeviceTopic`].

use std::fmt;

use crate::error::{Error, Result};
use crate::TOPIC_NAMESPACE;

/// Which half of a device's topic pair a string refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind {
    /// Gateway -> device command channel
    Command,
    /// Device -> gateway acknowledgment channel
    State,
}

impl TopicKind {
    fn suffix(self) -> &'static str {
        match self {
            TopicKind::Command => "command",
            TopicKind::State => "state",
        }
    }
}

/// The (room, device) pair a request addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceTopic {
    pub room: String,
    pub device: String,
}

impl DeviceTopic {
    pub fn new(room: &str, device: &str) -> Self {
        Self {
            room: room.to_string(),
            device: device.to_string(),
        }
    }

    /// Topic the gateway publishes commands to
    pub fn command(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            TOPIC_NAMESPACE,
            self.room,
            self.device,
            TopicKind::Command.suffix()
        )
    }

    /// Topic the device acknowledges on
    pub fn state(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            TOPIC_NAMESPACE,
            self.room,
            self.device,
            TopicKind::State.suffix()
        )
    }

    /// Parse a topic string back into its device and kind.
    ///
    /// Accepts exactly `smarthome/{room}/{device}/{command|state}`.
    pub fn parse(topic: &str) -> Result<(Self, TopicKind)> {
        let mut parts = topic.split('/');

        let invalid = || Error::InvalidTopic(topic.to_string());

        if parts.next() != Some(TOPIC_NAMESPACE) {
            return Err(invalid());
        }
        let room = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let device = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let kind = match parts.next() {
            Some("command") => TopicKind::Command,
            Some("state") => TopicKind::State,
            _ => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok((Self::new(room, device), kind))
    }
}

impl fmt::Display for DeviceTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.room, self.device)
    }
}
