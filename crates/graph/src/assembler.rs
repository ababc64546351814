use crate::builder::TopologyBuildContext;
use crate::record::{DeviceRecord, InterfaceRecord, TopologyRecord};
use crate::types::{
    BoundText, LinkAnnotation, NoteReason, NoteSource, UnattachedNote, ZoneAnnotation,
};
use netsketch_classifier::{complete_address, TextClass};
use netsketch_model::{DeviceKind, LinkId, ZoneId};
use std::collections::{BTreeMap, BTreeSet};

/// Turns association results into the final [`TopologyRecord`]
#[derive(Debug, Clone)]
pub struct TopologyAssembler {
    default_host_interface: String,
}

/// Output of [`TopologyAssembler::assemble`]
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub record: TopologyRecord,

    /// Association notes followed by everything the assembler could not use
    pub notes: Vec<UnattachedNote>,
}

impl Default for TopologyAssembler {
    fn default() -> Self {
        Self::new("eth0")
    }
}

impl TopologyAssembler {
    pub fn new(default_host_interface: impl Into<String>) -> Self {
        Self {
            default_host_interface: default_host_interface.into(),
        }
    }

    pub fn assemble(&self, ctx: &TopologyBuildContext) -> Assembly {
        let empty = ZoneAnnotation::default();
        let mut devices: BTreeMap<String, DeviceRecord> = BTreeMap::new();
        let mut notes = ctx.unattached.clone();
        let mut used_links = BTreeSet::new();

        for (&zone, &kind) in &ctx.zone_kinds {
            let ann = ctx.zone_annotation(zone).unwrap_or(&empty);
            let hostname = ann.hostname();
            let kind = match (hostname, kind) {
                (None, None) => {
                    log::warn!("Dropping {zone}: no hostname and no device kind");
                    notes.push(UnattachedNote::new(
                        NoteSource::Zone(zone),
                        String::new(),
                        None,
                        NoteReason::MissingIdentity,
                    ));
                    continue;
                }
                (_, kind) => kind.unwrap_or(DeviceKind::Unknown),
            };

            let base = hostname.map_or_else(|| format!("{kind}_{}", zone.0), str::to_string);
            let name = unique_name(&devices, base, zone);

            let interfaces = if kind.is_network_device() {
                self.network_interfaces(ctx, ann, &mut used_links, &mut notes)
            } else if kind.is_end_host() {
                self.host_interface(ctx, zone, ann, &mut used_links, &mut notes)
            } else {
                unused_bound(&ann.interfaces, NoteReason::UnusedText, &mut notes);
                unused_bound(&ann.addresses, NoteReason::NoInterface, &mut notes);
                BTreeMap::new()
            };
            unused_zone_text(ann, &mut notes);

            log::debug!("{zone} -> {name} ({kind}, {} interfaces)", interfaces.len());
            devices.insert(
                name,
                DeviceRecord {
                    device_type: kind,
                    interfaces,
                },
            );
        }

        for (link, annotation) in &ctx.link_labels {
            let in_use = used_links.contains(link);
            for (i, label) in annotation.labels.iter().enumerate() {
                let reason = if !in_use {
                    NoteReason::LinkUnused
                } else if annotation.is_used(i) {
                    continue;
                } else {
                    NoteReason::UnusedText
                };
                log::debug!("Label {:?} on {link} is not used ({reason})", label.text);
                notes.push(UnattachedNote::new(
                    NoteSource::TextZone(label.source),
                    label.text.clone(),
                    Some(label.class),
                    reason,
                ));
            }
        }

        let record = TopologyRecord::from_devices(devices);
        log::info!(
            "Assembled {} devices from {} zones, {} notes",
            record.len(),
            ctx.zone_kinds.len(),
            notes.len()
        );
        Assembly { record, notes }
    }

    /// Router/switch: one entry per interface label, each paired with an
    /// address on the same link when there is one
    fn network_interfaces(
        &self,
        ctx: &TopologyBuildContext,
        ann: &ZoneAnnotation,
        used_links: &mut BTreeSet<LinkId>,
        notes: &mut Vec<UnattachedNote>,
    ) -> BTreeMap<String, InterfaceRecord> {
        let mut used = vec![false; ann.addresses.len()];
        let mut paired: Vec<Option<usize>> = vec![None; ann.interfaces.len()];

        // Same link first, then whatever is left in reading order
        for (slot, iface) in paired.iter_mut().zip(&ann.interfaces) {
            let Some(link) = iface.link else { continue };
            if let Some(j) = (0..ann.addresses.len())
                .find(|&j| !used[j] && ann.addresses[j].link == Some(link))
            {
                used[j] = true;
                *slot = Some(j);
            }
        }
        for (slot, iface) in paired.iter_mut().zip(&ann.interfaces) {
            if slot.is_some() {
                continue;
            }
            if let Some(j) = (0..ann.addresses.len()).find(|&j| {
                !used[j] && (iface.link.is_none() || ann.addresses[j].link.is_none())
            }) {
                used[j] = true;
                *slot = Some(j);
            }
        }

        let mut interfaces = BTreeMap::new();
        for (iface, slot) in ann.interfaces.iter().zip(paired) {
            if interfaces.contains_key(&iface.text) {
                notes.push(bound_note(iface, NoteReason::UnusedText));
                continue;
            }
            let address = slot.map(|j| &ann.addresses[j]);
            let link = iface.link.or_else(|| address.and_then(|a| a.link));
            let ip = address.and_then(|a| resolve_ip(ctx, a, link, notes));
            used_links.extend(link);
            interfaces.insert(iface.text.clone(), interface_record(ctx, link, ip));
        }

        for (address, taken) in ann.addresses.iter().zip(used) {
            if !taken {
                log::debug!("No interface for address {:?}", address.text);
                notes.push(bound_note(address, NoteReason::NoInterface));
            }
        }
        interfaces
    }

    /// pc/server: a single interface carrying the first address
    fn host_interface(
        &self,
        ctx: &TopologyBuildContext,
        zone: ZoneId,
        ann: &ZoneAnnotation,
        used_links: &mut BTreeSet<LinkId>,
        notes: &mut Vec<UnattachedNote>,
    ) -> BTreeMap<String, InterfaceRecord> {
        let iface = ann.interfaces.first();
        let address = ann.addresses.first();
        let name = iface.map_or_else(|| self.default_host_interface.clone(), |i| i.text.clone());

        let link = address
            .and_then(|a| a.link)
            .or_else(|| iface.and_then(|i| i.link))
            .or_else(|| ctx.zone_links.get(&zone).and_then(|links| links.first().copied()));
        let ip = address.and_then(|a| resolve_ip(ctx, a, link, notes));
        used_links.extend(link);

        unused_bound(ann.interfaces.get(1..).unwrap_or_default(), NoteReason::UnusedText, notes);
        unused_bound(ann.addresses.get(1..).unwrap_or_default(), NoteReason::NoInterface, notes);

        let mut interfaces = BTreeMap::new();
        interfaces.insert(name, interface_record(ctx, link, ip));
        interfaces
    }
}

/// `base`, or `base_<zone id>` when taken, with a counter appended until free
fn unique_name(devices: &BTreeMap<String, DeviceRecord>, base: String, zone: ZoneId) -> String {
    if !devices.contains_key(&base) {
        return base;
    }
    let mut renamed = format!("{base}_{}", zone.0);
    let mut counter = 2;
    while devices.contains_key(&renamed) {
        renamed = format!("{base}_{}_{counter}", zone.0);
        counter += 1;
    }
    log::warn!("Hostname {base} is already taken, {zone} becomes {renamed}");
    renamed
}

/// Full address for a zone address, completing partial ones with the
/// network written on `link`
fn resolve_ip(
    ctx: &TopologyBuildContext,
    address: &BoundText,
    link: Option<LinkId>,
    notes: &mut Vec<UnattachedNote>,
) -> Option<String> {
    if address.class == TextClass::Ip {
        return Some(address.text.clone());
    }

    let network = link
        .and_then(|id| ctx.link_annotation(id))
        .and_then(LinkAnnotation::network);
    let Some(network) = network else {
        log::debug!("Cannot complete {:?}: no network on {link:?}", address.text);
        notes.push(bound_note(address, NoteReason::NoNetworkOnLink));
        return None;
    };

    let completed = complete_address(&address.text, &network);
    if completed.is_none() {
        log::warn!("Address {:?} does not fit {network}", address.text);
        notes.push(bound_note(address, NoteReason::CompletionFailed));
    }
    completed
}

fn interface_record(
    ctx: &TopologyBuildContext,
    link: Option<LinkId>,
    ip: Option<String>,
) -> InterfaceRecord {
    let annotation = link.and_then(|id| ctx.link_annotation(id));
    InterfaceRecord {
        ip,
        protocol: annotation
            .and_then(LinkAnnotation::protocol)
            .map(str::to_string),
        vlan: annotation.and_then(LinkAnnotation::vlan),
    }
}

fn bound_note(text: &BoundText, reason: NoteReason) -> UnattachedNote {
    UnattachedNote::new(
        NoteSource::Fragment(text.fragment),
        text.text.clone(),
        Some(text.class),
        reason,
    )
}

fn unused_bound(texts: &[BoundText], reason: NoteReason, notes: &mut Vec<UnattachedNote>) {
    notes.extend(texts.iter().map(|text| bound_note(text, reason)));
}

/// Extra hostnames, captions that did not name the device, and leftovers
fn unused_zone_text(ann: &ZoneAnnotation, notes: &mut Vec<UnattachedNote>) {
    let hostname_caption = if ann.hostnames.is_empty() {
        ann.captions
            .iter()
            .position(|caption| caption.class == TextClass::Hostname)
    } else {
        None
    };

    let captions = ann
        .captions
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != hostname_caption)
        .map(|(_, caption)| caption);
    for text in ann.hostnames.iter().skip(1).chain(captions).chain(&ann.others) {
        notes.push(UnattachedNote::new(
            text.source,
            text.text.clone(),
            Some(text.class),
            NoteReason::UnusedText,
        ));
    }
}
