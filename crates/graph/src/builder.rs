use crate::error::{GraphError, Result};
use crate::types::*;
use netsketch_classifier::{classify, normalize_interface, TextClass};
use netsketch_geometry::{boundary_distance, boundary_distance_to_segment, Polygon};
use netsketch_model::{
    DetectionBatch, DeviceKind, LinkId, RegionKey, TextFragment, TextRole, TextZoneId, ZoneId,
};
use netsketch_ocr::{read_label, reading_order, Recognized};
use std::collections::BTreeMap;

/// Intermediate associations for one diagram.
///
/// Built once from a detection batch and its OCR output, then read by the
/// assembler. Nothing here is mutated after [`TopologyBuildContext::build`].
#[derive(Debug, Clone, Default)]
pub struct TopologyBuildContext {
    /// Detector kind per equipment zone
    pub zone_kinds: BTreeMap<ZoneId, Option<DeviceKind>>,

    /// Links whose segment lies within the attach distance of each zone
    pub zone_links: BTreeMap<ZoneId, Vec<LinkId>>,

    /// Zones touched by each link
    pub link_zones: BTreeMap<LinkId, Vec<ZoneId>>,

    /// Links touching fewer than two zones
    pub dangling_links: Vec<LinkId>,

    pub zone_graph: ZoneGraph,

    pub link_labels: BTreeMap<LinkId, LinkAnnotation>,

    /// Zone text in reading order, each fragment tagged with its class
    pub zone_fragments: BTreeMap<ZoneId, Vec<TextFragment>>,

    pub zone_texts: BTreeMap<ZoneId, ZoneAnnotation>,

    pub unattached: Vec<UnattachedNote>,
}

impl TopologyBuildContext {
    pub fn build(
        batch: &DetectionBatch,
        recognized: &Recognized,
        config: &AssociationConfig,
    ) -> Result<Self> {
        config.validate()?;
        for key in recognized.keys() {
            let known = match key {
                RegionKey::Zone(id) => batch.zone(*id).is_some(),
                RegionKey::TextZone(id) => batch.text_zone(*id).is_some(),
            };
            if !known {
                return Err(GraphError::UnknownRegion(*key));
            }
        }

        let mut ctx = Self {
            zone_kinds: batch.zones().iter().map(|z| (z.id, z.kind)).collect(),
            zone_links: BTreeMap::new(),
            link_zones: batch.links().iter().map(|l| (l.id, Vec::new())).collect(),
            dangling_links: Vec::new(),
            zone_graph: ZoneGraph::new(),
            link_labels: BTreeMap::new(),
            zone_fragments: BTreeMap::new(),
            zone_texts: BTreeMap::new(),
            unattached: Vec::new(),
        };

        let zone_polygons = ctx.attach_links(batch, config);
        ctx.link_zones_graph();
        ctx.attach_link_labels(batch, recognized, config);
        ctx.read_zone_text(batch, recognized);
        ctx.attach_captions(batch, recognized, &zone_polygons, config);

        log::info!(
            "Associated {} zones and {} links: {} zone edges, {} dangling links, \
             {} labelled links, {} unattached notes",
            ctx.zone_kinds.len(),
            ctx.link_zones.len(),
            ctx.zone_graph.edge_count(),
            ctx.dangling_links.len(),
            ctx.link_labels.len(),
            ctx.unattached.len()
        );
        Ok(ctx)
    }

    /// Phase 1: zone <-> link, every link under the threshold is kept
    fn attach_links(
        &mut self,
        batch: &DetectionBatch,
        config: &AssociationConfig,
    ) -> BTreeMap<ZoneId, Polygon> {
        let mut polygons = BTreeMap::new();
        for zone in batch.zones() {
            let links = self.zone_links.entry(zone.id).or_default();
            let Some(polygon) = zone.bbox.polygon() else {
                log::warn!("Skipping degenerate outline of {}", zone.id);
                self.unattached.push(UnattachedNote::new(
                    NoteSource::Zone(zone.id),
                    String::new(),
                    None,
                    NoteReason::DegenerateShape,
                ));
                continue;
            };
            for link in batch.links() {
                let distance = boundary_distance_to_segment(&polygon, &link.endpoints());
                if distance <= config.link_attach_distance {
                    log::debug!("{} attaches to {} at distance {distance:.2}", link.id, zone.id);
                    links.push(link.id);
                    if let Some(zones) = self.link_zones.get_mut(&link.id) {
                        zones.push(zone.id);
                    }
                }
            }
            polygons.insert(zone.id, polygon);
        }
        polygons
    }

    /// Phase 2: zone <-> zone over every pair sharing a link
    fn link_zones_graph(&mut self) {
        for &zone in self.zone_kinds.keys() {
            self.zone_graph.add_zone(zone);
        }
        for (&link, zones) in &self.link_zones {
            if zones.len() < 2 {
                log::warn!("{link} touches {} zone(s), treating it as dangling", zones.len());
                self.dangling_links.push(link);
                continue;
            }
            for (i, &a) in zones.iter().enumerate() {
                for &b in &zones[i + 1..] {
                    self.zone_graph.add_link(a, b, link);
                }
            }
        }
    }

    /// Phase 3: each link-label text zone goes to its single closest link
    fn attach_link_labels(
        &mut self,
        batch: &DetectionBatch,
        recognized: &Recognized,
        config: &AssociationConfig,
    ) {
        for zone in batch.text_zones() {
            if zone.role != TextRole::LinkLabel {
                continue;
            }
            let Some((text, class)) = label_text(recognized, zone.id) else {
                continue;
            };
            let source = NoteSource::TextZone(zone.id);
            let Some(polygon) = zone.bbox.polygon() else {
                self.note(source, text, Some(class), NoteReason::DegenerateShape);
                continue;
            };

            let closest = nearest(batch.links().iter().map(|link| {
                (link.id, boundary_distance_to_segment(&polygon, &link.endpoints()))
            }));
            let within_cap = |distance: f64| {
                config
                    .label_link_max_distance
                    .map_or(true, |cap| distance <= cap)
            };
            match closest {
                Some((link_id, distance)) if within_cap(distance) => {
                    log::debug!("Label {text:?} ({class}) rides on {link_id}");
                    if let Some(link) = batch.link(link_id) {
                        self.link_labels
                            .entry(link_id)
                            .or_insert_with(|| LinkAnnotation::new(link.endpoints()))
                            .labels
                            .push(LinkLabel {
                                source: zone.id,
                                text,
                                class,
                            });
                    }
                }
                _ => self.note(source, text, Some(class), NoteReason::NoLinkNearby),
            }
        }
    }

    /// Phase 4: text inside equipment zones, classified piece by piece
    fn read_zone_text(&mut self, batch: &DetectionBatch, recognized: &Recognized) {
        for zone in batch.zones() {
            let Some(fragments) = recognized.get(&RegionKey::Zone(zone.id)) else {
                self.zone_texts.entry(zone.id).or_default();
                continue;
            };
            let tagged: Vec<TextFragment> = reading_order(fragments)
                .into_iter()
                .map(|fragment| {
                    let class = classify(&fragment.text);
                    fragment.clone().with_class(class)
                })
                .collect();

            let links = self.zone_links.get(&zone.id).map(Vec::as_slice).unwrap_or_default();
            let ann = self.zone_texts.entry(zone.id).or_default();
            for fragment in &tagged {
                let class = fragment.class.unwrap_or(TextClass::Other);
                let source = NoteSource::Fragment(fragment.id);
                let bound = |text: String| BoundText {
                    fragment: fragment.id,
                    text,
                    class,
                    link: nearest_link(fragment, links, batch),
                };
                match class {
                    TextClass::Hostname => ann.hostnames.push(ClassifiedText {
                        source,
                        text: fragment.text.clone(),
                        class,
                    }),
                    TextClass::Interface => {
                        ann.interfaces.push(bound(normalize_interface(&fragment.text)))
                    }
                    TextClass::Ip | TextClass::IncompleteIp => {
                        ann.addresses.push(bound(fragment.text.clone()))
                    }
                    // A bare number inside a device is more likely a host octet
                    TextClass::Vlan if fragment.text.chars().all(|c| c.is_ascii_digit()) => {
                        ann.addresses.push(bound(fragment.text.clone()))
                    }
                    _ => ann.others.push(ClassifiedText {
                        source,
                        text: fragment.text.clone(),
                        class,
                    }),
                }
            }
            self.zone_fragments.insert(zone.id, tagged);
        }
    }

    /// Phase 5: free text goes to the closest equipment zone within the cap
    fn attach_captions(
        &mut self,
        batch: &DetectionBatch,
        recognized: &Recognized,
        zone_polygons: &BTreeMap<ZoneId, Polygon>,
        config: &AssociationConfig,
    ) {
        for zone in batch.text_zones() {
            if zone.role != TextRole::FreeText {
                continue;
            }
            let Some((text, class)) = label_text(recognized, zone.id) else {
                continue;
            };
            let source = NoteSource::TextZone(zone.id);
            let Some(polygon) = zone.bbox.polygon() else {
                self.note(source, text, Some(class), NoteReason::DegenerateShape);
                continue;
            };

            let closest = nearest(
                zone_polygons
                    .iter()
                    .map(|(&id, outline)| (id, boundary_distance(&polygon, outline))),
            );
            match closest {
                Some((zone_id, distance)) if distance <= config.free_text_max_distance => {
                    log::debug!("Caption {text:?} belongs to {zone_id}");
                    self.zone_texts
                        .entry(zone_id)
                        .or_default()
                        .captions
                        .push(ClassifiedText {
                            source,
                            text,
                            class,
                        });
                }
                _ => self.note(source, text, Some(class), NoteReason::NoZoneNearby),
            }
        }
    }

    fn note(
        &mut self,
        source: NoteSource,
        text: String,
        class: Option<TextClass>,
        reason: NoteReason,
    ) {
        log::warn!("Unattached {source}: {text:?} ({reason})");
        self.unattached
            .push(UnattachedNote::new(source, text, class, reason));
    }

    pub fn zone_annotation(&self, zone: ZoneId) -> Option<&ZoneAnnotation> {
        self.zone_texts.get(&zone)
    }

    pub fn link_annotation(&self, link: LinkId) -> Option<&LinkAnnotation> {
        self.link_labels.get(&link)
    }
}

/// Joined and classified text of one OCR text zone, `None` when blank
fn label_text(recognized: &Recognized, zone: TextZoneId) -> Option<(String, TextClass)> {
    let fragments = recognized.get(&RegionKey::TextZone(zone))?;
    let text = read_label(fragments);
    if text.is_empty() {
        return None;
    }
    let class = classify(&text);
    let text = if class == TextClass::Interface {
        normalize_interface(&text)
    } else {
        text
    };
    Some((text, class))
}

/// Smallest distance wins; ties go to the first (lowest) id
fn nearest<K: Ord + Copy>(candidates: impl Iterator<Item = (K, f64)>) -> Option<(K, f64)> {
    let mut best: Option<(K, f64)> = None;
    for (id, distance) in candidates {
        if !distance.is_finite() {
            continue;
        }
        best = match best {
            Some((best_id, best_distance))
                if best_distance < distance || (best_distance == distance && best_id < id) =>
            {
                Some((best_id, best_distance))
            }
            _ => Some((id, distance)),
        };
    }
    best
}

/// Closest of the zone's own links to a fragment
fn nearest_link(
    fragment: &TextFragment,
    links: &[LinkId],
    batch: &DetectionBatch,
) -> Option<LinkId> {
    let Some(polygon) = fragment.polygon() else {
        log::debug!("Fragment {} has a degenerate outline, leaving it unbound", fragment.id);
        return None;
    };
    nearest(links.iter().filter_map(|&id| {
        let link = batch.link(id)?;
        Some((id, boundary_distance_to_segment(&polygon, &link.endpoints())))
    }))
    .map(|(id, _)| id)
}
