use netsketch_classifier::TextClass;
use netsketch_geometry::{BoundingBox, OrientedBox, Point};
use netsketch_graph::{
    Assembly, AssociationConfig, GraphError, InterfaceRecord, NoteReason, NoteSource,
    TopologyAssembler, TopologyBuildContext,
};
use netsketch_model::{
    DetectionBatch, DeviceKind, EquipmentZone, FragmentId, Link, LinkId, RegionKey, TextFragment,
    TextRole, TextZone, TextZoneId, ZoneId,
};
use netsketch_ocr::Recognized;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn zone(id: u32, cx: f64, cy: f64, kind: Option<DeviceKind>) -> EquipmentZone {
    EquipmentZone {
        id: ZoneId(id),
        bbox: BoundingBox::new(cx, cy, 40.0, 40.0),
        kind,
    }
}

/// Thin vertical stroke at `x` from `top` to `bottom`
fn link(id: u32, x: f64, top: f64, bottom: f64) -> Link {
    Link {
        id: LinkId(id),
        bbox: OrientedBox {
            cx: x,
            cy: (top + bottom) / 2.0,
            width: 2.0,
            height: bottom - top,
            rotation: 0.0,
            corners: [
                Point::new(x - 1.0, top),
                Point::new(x + 1.0, top),
                Point::new(x + 1.0, bottom),
                Point::new(x - 1.0, bottom),
            ],
        },
    }
}

fn text_zone(id: u32, cx: f64, cy: f64, role: TextRole) -> TextZone {
    TextZone {
        id: TextZoneId(id),
        bbox: BoundingBox::new(cx, cy, 30.0, 10.0),
        role,
    }
}

/// Recognised text spanning `(x0, y0)`..`(x1, y1)` in image coordinates
fn fragment(
    region: RegionKey,
    index: u32,
    text: &str,
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
) -> TextFragment {
    TextFragment {
        id: FragmentId { region, index },
        text: text.to_string(),
        confidence: 0.9,
        quad: [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ],
        class: None,
    }
}

fn build(batch: &DetectionBatch, recognized: &Recognized) -> TopologyBuildContext {
    TopologyBuildContext::build(batch, recognized, &AssociationConfig::default()).unwrap()
}

/// Single text zone reading `text`, filling its whole box
fn label(batch: &DetectionBatch, recognized: &mut Recognized, id: u32, text: &str) {
    let key = RegionKey::TextZone(TextZoneId(id));
    let zone = batch.text_zone(TextZoneId(id)).unwrap();
    let (min, max) = (zone.bbox.origin(), zone.bbox.corners()[2]);
    recognized.insert(key, vec![fragment(key, 0, text, (min.x, min.y), (max.x, max.y))]);
}

/// Three zones stacked vertically, A-B over link 1 and B-C over link 2,
/// plus a stray link far to the right.
fn diagram() -> (DetectionBatch, Recognized) {
    let batch = DetectionBatch::new(
        vec![
            zone(1, 50.0, 50.0, Some(DeviceKind::Router)),
            zone(2, 50.0, 200.0, Some(DeviceKind::Switch)),
            zone(3, 50.0, 350.0, Some(DeviceKind::Pc)),
        ],
        vec![
            link(1, 50.0, 70.0, 180.0),
            link(2, 50.0, 220.0, 330.0),
            link(3, 400.0, 0.0, 100.0),
        ],
        vec![
            text_zone(10, 70.0, 110.0, TextRole::LinkLabel),
            text_zone(11, 70.0, 140.0, TextRole::LinkLabel),
            text_zone(12, 110.0, 200.0, TextRole::FreeText),
        ],
    )
    .unwrap();

    let a = RegionKey::Zone(ZoneId(1));
    let b = RegionKey::Zone(ZoneId(2));
    let mut recognized = Recognized::new();
    recognized.insert(
        a,
        vec![
            fragment(a, 0, "R1", (35.0, 35.0), (55.0, 42.0)),
            fragment(a, 1, "Gi0/0", (35.0, 50.0), (55.0, 57.0)),
            fragment(a, 2, "192.168.1.1/24", (35.0, 60.0), (65.0, 67.0)),
        ],
    );
    recognized.insert(
        b,
        vec![
            fragment(b, 0, "Fa0/1", (35.0, 185.0), (55.0, 192.0)),
            fragment(b, 1, ".2", (60.0, 186.0), (68.0, 193.0)),
        ],
    );
    recognized.insert(RegionKey::Zone(ZoneId(3)), Vec::new());
    for (id, text) in [(10, "OSPF"), (11, "192.168.1.0/24"), (12, "core-sw")] {
        label(&batch, &mut recognized, id, text);
    }
    (batch, recognized)
}

#[test]
fn router_interface_carries_its_address_and_link_protocol() {
    let (batch, recognized) = diagram();
    let ctx = build(&batch, &recognized);
    let assembly = TopologyAssembler::default().assemble(&ctx);

    let router = assembly.record.get("R1").expect("R1 assembled");
    assert_eq!(router.device_type, DeviceKind::Router);
    assert_eq!(router.interfaces.len(), 1);
    assert_eq!(
        router.interface("GigabitEthernet0/0"),
        Some(&InterfaceRecord {
            ip: Some("192.168.1.1/24".to_string()),
            protocol: Some("OSPF".to_string()),
            vlan: None,
        })
    );
}

#[test]
fn partial_address_is_completed_from_the_link_network() {
    let (batch, recognized) = diagram();
    let ctx = build(&batch, &recognized);
    let record = TopologyAssembler::default().assemble(&ctx).record;

    // Free text next to zone B names it
    let switch = record.get("core-sw").expect("caption hostname used");
    assert_eq!(switch.device_type, DeviceKind::Switch);
    assert_eq!(
        switch.interface("FastEthernet0/1").and_then(|i| i.ip.as_deref()),
        Some("192.168.1.2/24")
    );

    let pc = record.get("pc_3").expect("fallback hostname");
    assert_eq!(pc.interface("eth0"), Some(&InterfaceRecord::default()));
    assert_eq!(record.hostnames().collect::<Vec<_>>(), vec!["R1", "core-sw", "pc_3"]);
}

#[test]
fn zone_fragments_are_tagged_in_reading_order() {
    let (batch, recognized) = diagram();
    let ctx = build(&batch, &recognized);

    let tagged: Vec<(&str, Option<TextClass>)> = ctx.zone_fragments[&ZoneId(1)]
        .iter()
        .map(|fragment| (fragment.text.as_str(), fragment.class))
        .collect();
    assert_eq!(
        tagged,
        vec![
            ("R1", Some(TextClass::Hostname)),
            ("Gi0/0", Some(TextClass::Interface)),
            ("192.168.1.1/24", Some(TextClass::Ip)),
        ]
    );
    assert!(ctx.zone_fragments[&ZoneId(3)].is_empty());
}

#[test]
fn zones_are_linked_through_every_shared_link() {
    let (batch, recognized) = diagram();
    let ctx = build(&batch, &recognized);

    assert_eq!(ctx.zone_links[&ZoneId(2)], vec![LinkId(1), LinkId(2)]);
    assert_eq!(
        ctx.zone_graph.edges(),
        vec![
            (ZoneId(1), ZoneId(2), LinkId(1)),
            (ZoneId(2), ZoneId(3), LinkId(2)),
        ]
    );
    assert_eq!(ctx.dangling_links, vec![LinkId(3)]);
    assert_eq!(
        ctx.zone_graph.islands(),
        vec![vec![ZoneId(1), ZoneId(2), ZoneId(3)]]
    );

    let labels = &ctx.link_labels[&LinkId(1)];
    assert_eq!(labels.protocol(), Some("OSPF"));
    assert_eq!(labels.network().map(|n| n.to_string()).as_deref(), Some("192.168.1.0/24"));
}

#[test]
fn a_link_touching_three_zones_connects_all_pairs() {
    // Zones 1 and 3 are not neighbours in id order but share the long link
    let batch = DetectionBatch::new(
        vec![
            zone(1, 50.0, 50.0, Some(DeviceKind::Switch)),
            zone(2, 300.0, 50.0, Some(DeviceKind::Router)),
            zone(3, 50.0, 200.0, Some(DeviceKind::Switch)),
            zone(4, 50.0, 350.0, Some(DeviceKind::Switch)),
        ],
        vec![link(7, 50.0, 70.0, 330.0)],
        Vec::new(),
    )
    .unwrap();
    let ctx = build(&batch, &Recognized::new());

    assert_eq!(
        ctx.zone_graph.edges(),
        vec![
            (ZoneId(1), ZoneId(3), LinkId(7)),
            (ZoneId(1), ZoneId(4), LinkId(7)),
            (ZoneId(3), ZoneId(4), LinkId(7)),
        ]
    );
    assert_eq!(ctx.zone_graph.neighbors(ZoneId(2)), Vec::<ZoneId>::new());
    assert_eq!(ctx.zone_graph.islands().len(), 2);
}

#[test]
fn misplaced_text_ends_up_in_notes() {
    let batch = DetectionBatch::new(
        vec![zone(1, 50.0, 50.0, None), zone(2, 50.0, 200.0, Some(DeviceKind::Router))],
        vec![link(1, 50.0, 70.0, 180.0)],
        vec![
            text_zone(10, 600.0, 600.0, TextRole::LinkLabel),
            text_zone(11, 900.0, 900.0, TextRole::FreeText),
        ],
    )
    .unwrap();
    let b = RegionKey::Zone(ZoneId(2));
    let mut recognized = Recognized::new();
    recognized.insert(
        b,
        vec![
            fragment(b, 0, "Gi0/1", (35.0, 185.0), (55.0, 192.0)),
            fragment(b, 1, ".255", (35.0, 200.0), (50.0, 207.0)),
        ],
    );
    label(&batch, &mut recognized, 10, "10.0.0.0/8");
    label(&batch, &mut recognized, 11, "lab");

    let config = AssociationConfig {
        label_link_max_distance: Some(100.0),
        ..AssociationConfig::default()
    };
    let ctx = TopologyBuildContext::build(&batch, &recognized, &config).unwrap();
    let assembly = TopologyAssembler::default().assemble(&ctx);

    let reasons: Vec<(NoteSource, NoteReason)> =
        assembly.notes.iter().map(|n| (n.source, n.reason)).collect();
    assert!(reasons.contains(&(NoteSource::TextZone(TextZoneId(10)), NoteReason::NoLinkNearby)));
    assert!(reasons.contains(&(NoteSource::TextZone(TextZoneId(11)), NoteReason::NoZoneNearby)));
    assert!(reasons.contains(&(NoteSource::Zone(ZoneId(1)), NoteReason::MissingIdentity)));
    assert!(reasons.contains(&(
        NoteSource::Fragment(FragmentId { region: b, index: 1 }),
        NoteReason::NoNetworkOnLink
    )));

    // Zone 1 is dropped, zone 2 keeps its interface without an address
    assert_eq!(assembly.record.len(), 1);
    let router = assembly.record.get("router_2").unwrap();
    assert_eq!(router.interface("GigabitEthernet0/1"), Some(&InterfaceRecord::default()));
}

#[test]
fn duplicate_hostnames_are_suffixed_with_the_zone_id() {
    let batch = DetectionBatch::new(
        vec![
            zone(1, 50.0, 50.0, Some(DeviceKind::Router)),
            zone(5, 300.0, 50.0, Some(DeviceKind::Router)),
        ],
        Vec::new(),
        Vec::new(),
    )
    .unwrap();
    let mut recognized = Recognized::new();
    for (id, x) in [(1, 35.0), (5, 285.0)] {
        let key = RegionKey::Zone(ZoneId(id));
        recognized.insert(key, vec![fragment(key, 0, "R1", (x, 35.0), (x + 20.0, 42.0))]);
    }
    let ctx = build(&batch, &recognized);
    let record = TopologyAssembler::default().assemble(&ctx).record;

    assert_eq!(record.hostnames().collect::<Vec<_>>(), vec!["R1", "R1_5"]);
}

#[test]
fn renamed_duplicate_never_replaces_an_existing_device() {
    // Zone 2 is literally named what zone 3 would be renamed to
    let batch = DetectionBatch::new(
        vec![
            zone(1, 50.0, 50.0, Some(DeviceKind::Router)),
            zone(2, 300.0, 50.0, Some(DeviceKind::Router)),
            zone(3, 550.0, 50.0, Some(DeviceKind::Router)),
        ],
        Vec::new(),
        Vec::new(),
    )
    .unwrap();
    let mut recognized = Recognized::new();
    for (id, x, name) in [(1, 35.0, "R1"), (2, 285.0, "R1_3"), (3, 535.0, "R1")] {
        let key = RegionKey::Zone(ZoneId(id));
        recognized.insert(key, vec![fragment(key, 0, name, (x, 35.0), (x + 20.0, 42.0))]);
    }
    let assembly = TopologyAssembler::default().assemble(&build(&batch, &recognized));

    assert_eq!(assembly.record.len(), 3);
    assert_eq!(
        assembly.record.hostnames().collect::<Vec<_>>(),
        vec!["R1", "R1_3", "R1_3_2"]
    );
}

/// Two routers over one link, with `labels` written next to it, plus a
/// labelled link that touches nothing
fn labelled_link(labels: &[&str]) -> Assembly {
    let mut text_zones: Vec<TextZone> = (0..labels.len())
        .map(|i| text_zone(20 + i as u32, 70.0, 90.0 + 20.0 * i as f64, TextRole::LinkLabel))
        .collect();
    text_zones.push(text_zone(30, 420.0, 50.0, TextRole::LinkLabel));
    let batch = DetectionBatch::new(
        vec![
            zone(1, 50.0, 50.0, Some(DeviceKind::Router)),
            zone(2, 50.0, 200.0, Some(DeviceKind::Router)),
        ],
        vec![link(1, 50.0, 70.0, 180.0), link(2, 400.0, 0.0, 100.0)],
        text_zones,
    )
    .unwrap();

    let mut recognized = Recognized::new();
    let a = RegionKey::Zone(ZoneId(1));
    recognized.insert(
        a,
        vec![
            fragment(a, 0, "R1", (35.0, 35.0), (55.0, 42.0)),
            fragment(a, 1, "Gi0/0", (35.0, 55.0), (55.0, 62.0)),
        ],
    );
    for (i, text) in labels.iter().enumerate() {
        label(&batch, &mut recognized, 20 + i as u32, text);
    }
    label(&batch, &mut recognized, 30, "VLAN 40");
    TopologyAssembler::default().assemble(&build(&batch, &recognized))
}

fn label_notes(assembly: &Assembly) -> Vec<(String, NoteReason)> {
    assembly
        .notes
        .iter()
        .filter(|note| matches!(note.source, NoteSource::TextZone(_)))
        .map(|note| (note.text.clone(), note.reason))
        .collect()
}

#[test]
fn every_unused_link_label_is_noted() {
    let assembly = labelled_link(&["OSPF", "Gi0/3", "EIGRP", "VLAN 20", "VLAN 30"]);

    let router = assembly.record.get("R1").unwrap();
    assert_eq!(
        router.interface("GigabitEthernet0/0"),
        Some(&InterfaceRecord {
            ip: None,
            protocol: Some("OSPF".to_string()),
            vlan: Some(20),
        })
    );
    assert_eq!(
        label_notes(&assembly),
        vec![
            ("GigabitEthernet0/3".to_string(), NoteReason::UnusedText),
            ("EIGRP".to_string(), NoteReason::UnusedText),
            ("VLAN 30".to_string(), NoteReason::UnusedText),
            ("VLAN 40".to_string(), NoteReason::LinkUnused),
        ]
    );
}

#[test]
fn second_network_on_a_link_is_noted() {
    let assembly = labelled_link(&["10.0.0.0/30", "10.9.9.0/24"]);
    assert_eq!(
        label_notes(&assembly),
        vec![
            ("10.9.9.0/24".to_string(), NoteReason::UnusedText),
            ("VLAN 40".to_string(), NoteReason::LinkUnused),
        ]
    );
}

#[test]
fn ocr_output_for_unknown_regions_is_rejected() {
    let batch = DetectionBatch::new(Vec::new(), Vec::new(), Vec::new()).unwrap();
    let mut recognized = Recognized::new();
    recognized.insert(RegionKey::Zone(ZoneId(9)), Vec::new());

    let err = TopologyBuildContext::build(&batch, &recognized, &AssociationConfig::default())
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownRegion(RegionKey::Zone(ZoneId(9)))));
}

proptest! {
    #[test]
    fn proptest_link_attaches_only_within_threshold(gap in 0.0f64..6.0) {
        prop_assume!((gap - 2.0).abs() > 1e-6);
        // Zone spans x 30..70; the stroke runs at x = 70 + gap
        let stroke = link(1, 71.0 + gap, 40.0, 60.0);
        let router = zone(1, 50.0, 50.0, Some(DeviceKind::Router));
        let batch = DetectionBatch::new(vec![router], vec![stroke], Vec::new()).unwrap();
        let ctx = build(&batch, &Recognized::new());

        let attached = ctx.zone_links[&ZoneId(1)].contains(&LinkId(1));
        prop_assert_eq!(attached, gap <= 2.0);
    }
}
