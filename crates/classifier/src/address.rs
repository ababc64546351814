use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrParseError {
    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Invalid prefix length: {0}")]
    InvalidPrefix(String),
}

/// IPv4 network in CIDR notation.
///
/// Parsing is lenient: host bits are cleared, and a missing `/p` means `/32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    pub fn new(address: Ipv4Addr, prefix: u8) -> Result<Self, CidrParseError> {
        if prefix > 32 {
            return Err(CidrParseError::InvalidPrefix(prefix.to_string()));
        }
        let bits = u32::from(address) & mask_bits(prefix);
        Ok(Self {
            address: Ipv4Addr::from(bits),
            prefix,
        })
    }

    /// Network address (host bits cleared)
    #[must_use]
    pub const fn address(&self) -> Ipv4Addr {
        self.address
    }

    #[must_use]
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    #[must_use]
    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(mask_bits(self.prefix))
    }
}

fn mask_bits(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p.min(32))),
    }
}

impl FromStr for Ipv4Cidr {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => {
                let prefix = prefix
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| CidrParseError::InvalidPrefix(prefix.to_string()))?;
                (addr, prefix)
            }
            None => (s, 32),
        };
        let address = addr
            .trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| CidrParseError::InvalidAddress(addr.to_string()))?;
        Self::new(address, prefix)
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = CidrParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ipv4Cidr> for String {
    fn from(value: Ipv4Cidr) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

/// Rebuild a full `a.b.c.d/p` address from the trailing octets in `fragment`.
///
/// Let `i` be the first mask octet that is not 255. The fragment may supply
/// at most the `4 - i` host-side octets, and the rebuilt octet at `i` must
/// lie strictly inside the block that starts at the network octet, excluding
/// the network and broadcast values. A `/mask` on the fragment is ignored.
///
/// Only the boundary octet is range-checked. On masks wider than one octet
/// this refuses some real hosts: `.5` in `172.16.0.0/16` rebuilds to
/// `172.16.0.5`, whose boundary octet equals the network's, so the result is
/// `None` rather than a possibly wrong address. The same holds for `0.5`.
#[must_use]
pub fn complete_address(fragment: &str, network: &Ipv4Cidr) -> Option<String> {
    let digits = fragment.trim().split('/').next().unwrap_or_default();
    let supplied = digits
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;

    let net = network.address().octets();
    let mask = network.netmask().octets();
    let boundary = mask.iter().position(|&octet| octet != 255)?;
    let k = supplied.len();
    if boundary == 0 || k == 0 || k > 4 - boundary {
        log::debug!("Cannot complete {fragment:?} within {network}");
        return None;
    }

    let mut address = net;
    address[4 - k..].copy_from_slice(&supplied);

    let low = u16::from(net[boundary]);
    let block = 256 - u16::from(mask[boundary]);
    let value = u16::from(address[boundary]);
    if value <= low || value + 1 >= low + block {
        log::debug!("Completed {fragment:?} falls outside the host range of {network}");
        return None;
    }

    Some(format!("{}/{}", Ipv4Addr::from(address), network.prefix()))
}
