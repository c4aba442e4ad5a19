//! Device capability directory
//!
//! A static table of every room, device, and the actions each device
//! accepts. Requests are checked against it before anything touches
//! the transport.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Device categories known to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Switch,
    DimmableLight,
    AirConditioner,
    Fan,
    Oven,
}

/// One device's capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub valid_actions: Vec<String>,
}

impl DeviceSpec {
    pub fn new(kind: DeviceKind, actions: &[&str]) -> Self {
        Self {
            kind,
            valid_actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn allows(&self, action: &str) -> bool {
        self.valid_actions.iter().any(|a| a == action)
    }
}

/// Capability table for the whole home
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceDirectory {
    rooms: BTreeMap<String, BTreeMap<String, DeviceSpec>>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The deployed home layout
    pub fn default_home() -> Self {
        let mut dir = Self::new();

        dir.insert("livingroom", "light", DeviceSpec::new(DeviceKind::Switch, &["ON", "OFF"]));
        dir.insert(
            "livingroom",
            "ac",
            DeviceSpec::new(DeviceKind::AirConditioner, &["ON", "OFF", "SET_TEMP"]),
        );

        dir.insert("bedroom", "main_light", DeviceSpec::new(DeviceKind::Switch, &["ON", "OFF"]));
        dir.insert(
            "bedroom",
            "bedside_light",
            DeviceSpec::new(DeviceKind::DimmableLight, &["ON", "OFF", "SET_BRIGHTNESS"]),
        );
        dir.insert(
            "bedroom",
            "ac",
            DeviceSpec::new(DeviceKind::AirConditioner, &["ON", "OFF", "SET_TEMP"]),
        );

        dir.insert("kitchen", "light", DeviceSpec::new(DeviceKind::Switch, &["ON", "OFF"]));
        dir.insert(
            "kitchen",
            "hood",
            DeviceSpec::new(DeviceKind::Fan, &["ON", "OFF", "SET_SPEED"]),
        );
        dir.insert(
            "kitchen",
            "oven",
            DeviceSpec::new(DeviceKind::Oven, &["START", "STOP", "SET_MODE"]),
        );

        dir.insert("bathroom", "light", DeviceSpec::new(DeviceKind::Switch, &["ON", "OFF"]));

        dir
    }

    /// Add or replace a device entry
    pub fn insert(&mut self, room: &str, device: &str, spec: DeviceSpec) {
        self.rooms
            .entry(room.to_string())
            .or_default()
            .insert(device.to_string(), spec);
    }

    pub fn lookup(&self, room: &str, device: &str) -> Option<&DeviceSpec> {
        self.rooms.get(room)?.get(device)
    }

    /// Check that (room, device, action) names a permitted request
    pub fn validate(&self, room: &str, device: &str, action: &str) -> Result<()> {
        let devices = self
            .rooms
            .get(room)
            .ok_or_else(|| Error::UnknownRoom(room.to_string()))?;
        let spec = devices.get(device).ok_or_else(|| Error::UnknownDevice {
            room: room.to_string(),
            device: device.to_string(),
        })?;
        if !spec.allows(action) {
            return Err(Error::UnsupportedAction {
                room: room.to_string(),
                device: device.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    /// Iterate rooms with their devices
    pub fn rooms(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, DeviceSpec>)> {
        self.rooms.iter().map(|(room, devices)| (room.as_str(), devices))
    }

    pub fn device_count(&self) -> usize {
        self.rooms.values().map(BTreeMap::len).sum()
    }
}
