use crate::error::{GraphError, Result};
use netsketch_classifier::{canonical_protocol, parse_interface, Ipv4Cidr, TextClass};
use netsketch_geometry::Segment;
use netsketch_model::{FragmentId, LinkId, TextZoneId, ZoneId};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Distance thresholds used when matching detections to each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationConfig {
    /// A link belongs to a zone when its segment is this close to the zone outline
    pub link_attach_distance: f64,

    /// Optional cap for link-label text to link matching
    pub label_link_max_distance: Option<f64>,

    /// Cap for free text to equipment zone matching
    pub free_text_max_distance: f64,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            link_attach_distance: 2.0,
            label_link_max_distance: None,
            free_text_max_distance: 50.0,
        }
    }
}

impl AssociationConfig {
    pub fn validate(&self) -> Result<()> {
        let check = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(GraphError::config(format!(
                    "{name} must be a non-negative number, got {value}"
                )))
            }
        };
        check("link_attach_distance", self.link_attach_distance)?;
        check("free_text_max_distance", self.free_text_max_distance)?;
        if let Some(cap) = self.label_link_max_distance {
            check("label_link_max_distance", cap)?;
        }
        Ok(())
    }
}

/// Undirected zone connectivity: one node per equipment zone, one edge per
/// pair of zones sharing a link (edge weight is the link id)
#[derive(Debug, Clone, Default)]
pub struct ZoneGraph {
    pub graph: UnGraph<ZoneId, LinkId>,

    /// Zone id -> NodeIndex mapping for fast lookup
    pub zone_index: HashMap<ZoneId, NodeIndex>,
}

impl ZoneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone, returning the existing node when already present
    pub fn add_zone(&mut self, zone: ZoneId) -> NodeIndex {
        if let Some(&idx) = self.zone_index.get(&zone) {
            return idx;
        }
        let idx = self.graph.add_node(zone);
        self.zone_index.insert(zone, idx);
        idx
    }

    /// Connect two zones through `link`
    pub fn add_link(&mut self, a: ZoneId, b: ZoneId, link: LinkId) {
        let from = self.add_zone(a);
        let to = self.add_zone(b);
        self.graph.add_edge(from, to, link);
    }

    pub fn find_node(&self, zone: ZoneId) -> Option<NodeIndex> {
        self.zone_index.get(&zone).copied()
    }

    pub fn zone_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Classified text from a link-label text zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkLabel {
    pub source: TextZoneId,
    pub text: String,
    pub class: TextClass,
}

/// Everything written along one link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkAnnotation {
    pub labels: Vec<LinkLabel>,
    pub endpoints: Segment,
}

impl LinkAnnotation {
    pub fn new(endpoints: Segment) -> Self {
        Self {
            labels: Vec::new(),
            endpoints,
        }
    }

    /// First complete address on the link, read as the link's network
    pub fn network(&self) -> Option<Ipv4Cidr> {
        self.network_label().map(|(_, network)| network)
    }

    /// Canonical spelling of the first protocol keyword
    pub fn protocol(&self) -> Option<&'static str> {
        self.protocol_label().map(|(_, protocol)| protocol)
    }

    /// VLAN id from a `VLAN 20` / `20` label or a `Vlan20` interface label
    pub fn vlan(&self) -> Option<u16> {
        self.vlan_label().map(|(_, vlan)| vlan)
    }

    /// Whether label `index` supplies the network, protocol or VLAN
    pub fn is_used(&self, index: usize) -> bool {
        [
            self.network_label().map(|(i, _)| i),
            self.protocol_label().map(|(i, _)| i),
            self.vlan_label().map(|(i, _)| i),
        ]
        .contains(&Some(index))
    }

    fn network_label(&self) -> Option<(usize, Ipv4Cidr)> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.class == TextClass::Ip)
            .find_map(|(i, label)| Some((i, label.text.parse().ok()?)))
    }

    fn protocol_label(&self) -> Option<(usize, &'static str)> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.class == TextClass::Protocol)
            .find_map(|(i, label)| Some((i, canonical_protocol(&label.text)?)))
    }

    fn vlan_label(&self) -> Option<(usize, u16)> {
        self.labels.iter().enumerate().find_map(|(i, label)| {
            let vlan = match label.class {
                TextClass::Vlan => vlan_number(&label.text),
                TextClass::Interface => parse_interface(&label.text)
                    .and_then(|name| name.strip_prefix("Vlan").and_then(vlan_number)),
                _ => None,
            }?;
            Some((i, vlan))
        })
    }
}

fn vlan_number(text: &str) -> Option<u16> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|id| (1..=4094).contains(id))
}

/// Zone text bound to the nearest of the zone's links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundText {
    pub fragment: FragmentId,
    /// Normalised text (canonical interface name for interfaces)
    pub text: String,
    pub class: TextClass,
    pub link: Option<LinkId>,
}

/// Classified text that is not bound to a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedText {
    pub source: NoteSource,
    pub text: String,
    pub class: TextClass,
}

/// Text gathered for one equipment zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneAnnotation {
    /// Hostnames read inside the zone, in reading order
    pub hostnames: Vec<ClassifiedText>,

    /// Free-text captions attached to this zone
    pub captions: Vec<ClassifiedText>,

    pub interfaces: Vec<BoundText>,

    /// Complete and incomplete addresses, plus bare numbers that may be host octets
    pub addresses: Vec<BoundText>,

    /// Remaining zone text (protocols, VLAN labels, unrecognised words)
    pub others: Vec<ClassifiedText>,
}

impl ZoneAnnotation {
    /// Hostname read in the zone, else one from an attached caption
    pub fn hostname(&self) -> Option<&str> {
        self.hostnames
            .first()
            .or_else(|| {
                self.captions
                    .iter()
                    .find(|caption| caption.class == TextClass::Hostname)
            })
            .map(|text| text.text.as_str())
    }
}

/// Where an unattached note came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NoteSource {
    Zone(ZoneId),
    Link(LinkId),
    TextZone(TextZoneId),
    Fragment(FragmentId),
}

impl fmt::Display for NoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone(id) => write!(f, "{id}"),
            Self::Link(id) => write!(f, "{id}"),
            Self::TextZone(id) => write!(f, "{id}"),
            Self::Fragment(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteReason {
    /// Shape with zero area or a self-intersecting outline
    DegenerateShape,
    NoLinkNearby,
    NoZoneNearby,
    /// Incomplete address on a link that carries no network label
    NoNetworkOnLink,
    /// Incomplete address outside the host range of the link network
    CompletionFailed,
    /// Address with no interface to carry it
    NoInterface,
    /// Zone with neither a hostname nor a device kind
    MissingIdentity,
    /// Text kept in the zone but not used by the record
    UnusedText,
    /// Link label on a link that no interface ended up using
    LinkUnused,
}

impl NoteReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DegenerateShape => "degenerate shape",
            Self::NoLinkNearby => "no link nearby",
            Self::NoZoneNearby => "no equipment zone nearby",
            Self::NoNetworkOnLink => "no network address on the link",
            Self::CompletionFailed => "address outside the link network",
            Self::NoInterface => "no interface to carry the address",
            Self::MissingIdentity => "no hostname and no device kind",
            Self::UnusedText => "text not used by the topology",
            Self::LinkUnused => "no interface uses the link",
        }
    }
}

impl fmt::Display for NoteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text or detection that could not be placed, kept for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnattachedNote {
    pub source: NoteSource,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<TextClass>,
    pub reason: NoteReason,
}

impl UnattachedNote {
    pub fn new(
        source: NoteSource,
        text: impl Into<String>,
        class: Option<TextClass>,
        reason: NoteReason,
    ) -> Self {
        Self {
            source,
            text: text.into(),
            class,
            reason,
        }
    }
}
