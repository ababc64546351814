//! # Netsketch Classifier
//!
//! Pure text functions applied to OCR output from network diagrams.
//!
//! ## Classification precedence
//!
//! ```text
//! text
//!   │
//!   ├─ 1. interface name   (Gi0/1, fo/0, Lo1, Serial0/0/0 ...)
//!   ├─ 2. hostname         (R1, core-sw.lab; never purely numeric)
//!   ├─ 3. protocol keyword (OSPF, bgp, HSRP ...)
//!   ├─ 4. incomplete IPv4  (.12, .1.5/24, 10.1)
//!   ├─ 5. VLAN id          (10, VLAN 20)
//!   ├─ 6. complete IPv4    (192.168.1.1/24)
//!   └─ 7. other
//! ```
//!
//! The first matching step wins.
//!
//! ## Example
//!
//! ```rust
//! use netsketch_classifier::{classify, complete_address, normalize_interface, Ipv4Cidr, TextClass};
//!
//! assert_eq!(classify("Gi0/1"), TextClass::Interface);
//! assert_eq!(normalize_interface("fo/0"), "FastEthernet0/0");
//!
//! let network: Ipv4Cidr = "192.168.1.0/24".parse().unwrap();
//! assert_eq!(complete_address(".5", &network).as_deref(), Some("192.168.1.5/24"));
//! ```

mod address;
mod classify;
mod interface;

pub use address::{complete_address, CidrParseError, Ipv4Cidr};
pub use classify::{
    canonical_protocol, classify, is_complete_ipv4, is_hostname, is_incomplete_ipv4,
    is_protocol, is_vlan, TextClass, KNOWN_PROTOCOLS,
};
pub use interface::{is_interface, normalize_interface, parse_interface};
