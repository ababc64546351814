use once_cell::sync::Lazy;
use regex::Regex;

/// One interface family: accepted prefixes and the canonical long form.
///
/// `extra` is the allowed number of `/`-separated segments after the first.
/// Physical ports may carry a space between prefix and number (`Gi 0/1`);
/// logical ones may not, so `VLAN 20` stays a VLAN label.
struct Family {
    canonical: &'static str,
    aliases: &'static str,
    extra: (usize, usize),
    spaced: bool,
}

const FAMILIES: &[Family] = &[
    Family {
        canonical: "GigabitEthernet",
        aliases: "GigabitEthernet|Gig|Gi|g",
        extra: (1, 2),
        spaced: true,
    },
    Family {
        canonical: "FastEthernet",
        aliases: "FastEthernet|FastEth|Fa|fo|f",
        extra: (1, 2),
        spaced: true,
    },
    Family {
        canonical: "TenGigabitEthernet",
        aliases: "TenGigabitEthernet|TenGig|Te",
        extra: (1, 2),
        spaced: true,
    },
    Family {
        canonical: "Ethernet",
        aliases: "Ethernet|Eth|e",
        extra: (0, 2),
        spaced: true,
    },
    Family {
        canonical: "Serial",
        aliases: "Serial|Se|s",
        extra: (1, 3),
        spaced: true,
    },
    Family {
        canonical: "Loopback",
        aliases: "Loopback|Lo",
        extra: (0, 0),
        spaced: false,
    },
    Family {
        canonical: "Vlan",
        aliases: "Vlan|Vl|v",
        extra: (0, 0),
        spaced: false,
    },
    Family {
        canonical: "Port-channel",
        aliases: "Port-channel|Po",
        extra: (0, 0),
        spaced: false,
    },
];

static PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    FAMILIES
        .iter()
        .map(|family| {
            let (min, max) = family.extra;
            let gap = if family.spaced { " ?" } else { "" };
            // `o`/`O` stand in for a misread `0`, in the numeric suffix only
            let pattern = format!(
                r"(?i)^(?:{}){gap}([0-9oO]+(?:/[0-9oO]+){{{min},{max}}})$",
                family.aliases
            );
            let regex = Regex::new(&pattern).expect("valid interface regex");
            (regex, family.canonical)
        })
        .collect()
});

/// Canonical interface name, or `None` when `text` is not an interface label.
///
/// The numeric suffix must hold at least one real digit, so words such as
/// `loo` are not mistaken for `Loopback0`.
#[must_use]
pub fn parse_interface(text: &str) -> Option<String> {
    let text = text.trim();
    PATTERNS.iter().find_map(|(regex, canonical)| {
        let suffix = regex.captures(text)?.get(1)?.as_str();
        if !suffix.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let repaired: String = suffix
            .chars()
            .map(|c| if c == 'o' || c == 'O' { '0' } else { c })
            .collect();
        Some(format!("{canonical}{repaired}"))
    })
}

/// Expand abbreviated interface names (`Gi0/1` → `GigabitEthernet0/1`).
///
/// Text that is not an interface label is returned unchanged (trimmed), which
/// makes the function idempotent.
#[must_use]
pub fn normalize_interface(text: &str) -> String {
    parse_interface(text).unwrap_or_else(|| text.trim().to_string())
}

#[must_use]
pub fn is_interface(text: &str) -> bool {
    parse_interface(text).is_some()
}
