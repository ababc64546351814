use crate::interface::is_interface;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic tag assigned to one piece of diagram text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextClass {
    Hostname,
    Interface,
    Ip,
    IncompleteIp,
    Protocol,
    Vlan,
    Other,
}

impl TextClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hostname => "hostname",
            Self::Interface => "interface",
            Self::Ip => "ip",
            Self::IncompleteIp => "incomplete_ip",
            Self::Protocol => "protocol",
            Self::Vlan => "vlan",
            Self::Other => "other",
        }
    }

    /// Tags that carry an address, full or partial
    #[must_use]
    pub const fn is_address(self) -> bool {
        matches!(self, Self::Ip | Self::IncompleteIp)
    }
}

impl fmt::Display for TextClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const KNOWN_PROTOCOLS: &[&str] = &[
    "OSPF", "BGP", "EIGRP", "RIP", "ISIS", "HSRP", "VRRP", "GLBP", "STP", "RSTP", "MSTP", "LACP",
    "PAgP", "DHCP", "DNS", "NTP", "SNMP", "SSH", "Telnet", "HTTP", "HTTPS", "FTP", "TFTP", "ICMP",
    "TCP", "UDP", "GRE", "IPsec", "MPLS", "LDP",
];

const MASK: &str = r"(?:/(?:3[0-2]|[12]?[0-9]))?";

static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9](?:[a-zA-Z0-9_-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9_-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid hostname regex")
});

static VLAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:vlan\s?)?[0-9]{1,4}$").expect("valid vlan regex"));

static COMPLETE_IPV4: Lazy<Regex> = Lazy::new(|| {
    let octet = r"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";
    Regex::new(&format!(r"^(?:{octet}\.){{3}}{octet}{MASK}$")).expect("valid ipv4 regex")
});

static LEADING_DOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\.[0-9]{{1,3}}(?:\.[0-9]{{1,3}}){{0,2}}{MASK}$"))
        .expect("valid leading-dot regex")
});

static PARTIAL_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:[0-9]{{1,3}}\.){{1,2}}[0-9]{{1,3}}{MASK}$"))
        .expect("valid partial-run regex")
});

static BARE_OCTET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,3}$").expect("valid octet regex"));

/// Known routing/switching/service protocol, compared case-insensitively
#[must_use]
pub fn is_protocol(text: &str) -> bool {
    canonical_protocol(text).is_some()
}

/// Canonical spelling of a protocol keyword (`ospf` → `OSPF`, `ipsec` → `IPsec`)
#[must_use]
pub fn canonical_protocol(text: &str) -> Option<&'static str> {
    let text = text.trim();
    KNOWN_PROTOCOLS
        .iter()
        .copied()
        .find(|keyword| keyword.eq_ignore_ascii_case(text))
}

/// Dotted hostname: labels of at most 63 characters that start and end
/// alphanumeric.
///
/// A label made only of digits, dots and slashes is never a hostname, and
/// neither is a protocol keyword.
#[must_use]
pub fn is_hostname(text: &str) -> bool {
    let text = text.trim();
    if !text.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if is_protocol(text) {
        return false;
    }
    HOSTNAME.is_match(text)
}

#[must_use]
pub fn is_vlan(text: &str) -> bool {
    VLAN.is_match(text.trim())
}

/// Four octets in 0-255 with an optional `/0-32` mask
#[must_use]
pub fn is_complete_ipv4(text: &str) -> bool {
    COMPLETE_IPV4.is_match(text.trim())
}

/// Plausibly the tail of an address whose leading octets were lost:
/// `.12`, `.12.34/24`, `10.1`, `1.2.3` or a bare `1`-`3` digit token.
#[must_use]
pub fn is_incomplete_ipv4(text: &str) -> bool {
    let text = text.trim();
    LEADING_DOT.is_match(text) || PARTIAL_RUN.is_match(text) || BARE_OCTET.is_match(text)
}

/// Classify one piece of text; the first matching step wins.
///
/// A bare number is tagged [`TextClass::Vlan`]: only dotted fragments are
/// tagged [`TextClass::IncompleteIp`] here, and callers with link context
/// may still read a bare number as a host octet.
#[must_use]
pub fn classify(text: &str) -> TextClass {
    let text = text.trim();
    if text.is_empty() {
        return TextClass::Other;
    }

    if is_interface(text) {
        TextClass::Interface
    } else if is_hostname(text) {
        TextClass::Hostname
    } else if is_protocol(text) {
        TextClass::Protocol
    } else if text.contains('.') && is_incomplete_ipv4(text) {
        TextClass::IncompleteIp
    } else if is_vlan(text) {
        TextClass::Vlan
    } else if is_complete_ipv4(text) {
        TextClass::Ip
    } else {
        TextClass::Other
    }
}
