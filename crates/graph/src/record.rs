use netsketch_model::DeviceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Addressing and link properties of one interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_type: DeviceKind,

    /// Canonical interface name -> properties
    #[serde(default)]
    pub interfaces: BTreeMap<String, InterfaceRecord>,
}

impl DeviceRecord {
    pub fn interface(&self, name: &str) -> Option<&InterfaceRecord> {
        self.interfaces.get(name)
    }
}

/// Reconstructed topology: hostname -> device.
///
/// This is the hand-off shape for configuration generation. It is built by
/// [`crate::TopologyAssembler`] or loaded from disk and never patched in
/// place afterwards; a change means assembling again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopologyRecord {
    devices: BTreeMap<String, DeviceRecord>,
}

impl TopologyRecord {
    pub(crate) fn from_devices(devices: BTreeMap<String, DeviceRecord>) -> Self {
        Self { devices }
    }

    pub fn get(&self, hostname: &str) -> Option<&DeviceRecord> {
        self.devices.get(hostname)
    }

    pub fn devices(&self) -> impl Iterator<Item = (&str, &DeviceRecord)> {
        self.devices.iter().map(|(name, device)| (name.as_str(), device))
    }

    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
