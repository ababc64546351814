use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! detector_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

detector_id!(
    /// Equipment zone id, assigned by the detector and stable for one run
    ZoneId,
    "zone#"
);
detector_id!(LinkId, "link#");
detector_id!(TextZoneId, "text#");

/// Device kind reported by the equipment detector.
///
/// Deserialises from raw detector labels through [`DeviceKind::from_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum DeviceKind {
    Router,
    Switch,
    Pc,
    Server,
    Cloud,
    Unknown,
}

impl From<String> for DeviceKind {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl DeviceKind {
    /// Map a raw detector class label. Unrecognised labels become `Unknown`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "router" | "routers" => Self::Router,
            "switch" | "switches" => Self::Switch,
            "pc" | "pcs" => Self::Pc,
            "server" | "servers" => Self::Server,
            "cloud" | "clouds" => Self::Cloud,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::Switch => "switch",
            Self::Pc => "pc",
            Self::Server => "server",
            Self::Cloud => "cloud",
            Self::Unknown => "unknown",
        }
    }

    /// Network devices carry one interface per attached link
    #[must_use]
    pub const fn is_network_device(self) -> bool {
        matches!(self, Self::Router | Self::Switch)
    }

    /// End hosts collapse to a single interface
    #[must_use]
    pub const fn is_end_host(self) -> bool {
        matches!(self, Self::Pc | Self::Server)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a detected text zone annotates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    /// Text drawn along a link (subnet, protocol, VLAN)
    LinkLabel,
    /// Any other caption on the diagram
    FreeText,
}

/// Region submitted to the OCR engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RegionKey {
    Zone(ZoneId),
    TextZone(TextZoneId),
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone(id) => write!(f, "{id}"),
            Self::TextZone(id) => write!(f, "{id}"),
        }
    }
}

/// One OCR observation: the region it came from and its position in the
/// engine's output for that region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentId {
    pub region: RegionKey,
    pub index: u32,
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.index)
    }
}
