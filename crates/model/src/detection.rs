use crate::error::{ModelError, Result};
use crate::ocr::OcrRegion;
use crate::types::{DeviceKind, LinkId, RegionKey, TextRole, TextZoneId, ZoneId};
use netsketch_geometry::{BoundingBox, OrientedBox, Segment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Detected piece of equipment (router icon, switch, PC, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentZone {
    pub id: ZoneId,
    pub bbox: BoundingBox,
    /// Detector class; `None` when the detector gave no usable label
    #[serde(default)]
    pub kind: Option<DeviceKind>,
}

/// Detected connection stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub bbox: OrientedBox,
}

impl Link {
    /// Topmost and bottommost corners of the detector box
    #[must_use]
    pub fn endpoints(&self) -> Segment {
        self.bbox.endpoints()
    }
}

/// Detected block of text (link label or free caption)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextZone {
    pub id: TextZoneId,
    pub bbox: BoundingBox,
    pub role: TextRole,
}

/// Unvalidated detector payload, as read from disk or the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchParts {
    #[serde(default)]
    pub zones: Vec<EquipmentZone>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub text_zones: Vec<TextZone>,
}

/// All detections for one diagram.
///
/// Immutable once built; [`DetectionBatch::new`] is the only way in and it
/// rejects malformed payloads, so later stages can trust ids and coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BatchParts", into = "BatchParts")]
pub struct DetectionBatch {
    zones: Vec<EquipmentZone>,
    links: Vec<Link>,
    text_zones: Vec<TextZone>,
}

impl DetectionBatch {
    pub fn new(
        zones: Vec<EquipmentZone>,
        links: Vec<Link>,
        text_zones: Vec<TextZone>,
    ) -> Result<Self> {
        check_unique("zone", zones.iter().map(|z| z.id.0))?;
        check_unique("link", links.iter().map(|l| l.id.0))?;
        check_unique("text zone", text_zones.iter().map(|t| t.id.0))?;

        for zone in &zones {
            check_box(&zone.bbox, &zone.id.to_string())?;
        }
        for link in &links {
            let what = link.id.to_string();
            if !link.bbox.is_finite() {
                return Err(ModelError::non_finite(what));
            }
            if link.bbox.width < 0.0 || link.bbox.height < 0.0 {
                return Err(ModelError::negative_size(what));
            }
        }
        for text in &text_zones {
            check_box(&text.bbox, &text.id.to_string())?;
        }

        log::debug!(
            "Accepted detection batch: {} zones, {} links, {} text zones",
            zones.len(),
            links.len(),
            text_zones.len()
        );

        Ok(Self {
            zones,
            links,
            text_zones,
        })
    }

    #[must_use]
    pub fn zones(&self) -> &[EquipmentZone] {
        &self.zones
    }

    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    #[must_use]
    pub fn text_zones(&self) -> &[TextZone] {
        &self.text_zones
    }

    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&EquipmentZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    #[must_use]
    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn text_zone(&self, id: TextZoneId) -> Option<&TextZone> {
        self.text_zones.iter().find(|t| t.id == id)
    }

    /// Regions to send through OCR: every equipment zone, then every text zone
    #[must_use]
    pub fn ocr_regions(&self) -> Vec<OcrRegion> {
        let zones = self.zones.iter().map(|z| OcrRegion {
            key: RegionKey::Zone(z.id),
            bbox: z.bbox,
        });
        let texts = self.text_zones.iter().map(|t| OcrRegion {
            key: RegionKey::TextZone(t.id),
            bbox: t.bbox,
        });
        zones.chain(texts).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.links.is_empty() && self.text_zones.is_empty()
    }
}

impl TryFrom<BatchParts> for DetectionBatch {
    type Error = ModelError;

    fn try_from(parts: BatchParts) -> Result<Self> {
        Self::new(parts.zones, parts.links, parts.text_zones)
    }
}

impl From<DetectionBatch> for BatchParts {
    fn from(batch: DetectionBatch) -> Self {
        Self {
            zones: batch.zones,
            links: batch.links,
            text_zones: batch.text_zones,
        }
    }
}

fn check_unique(family: &'static str, ids: impl Iterator<Item = u32>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ModelError::DuplicateId { family, id });
        }
    }
    Ok(())
}

fn check_box(bbox: &BoundingBox, what: &str) -> Result<()> {
    if !bbox.is_finite() {
        return Err(ModelError::non_finite(what));
    }
    if bbox.width < 0.0 || bbox.height < 0.0 {
        return Err(ModelError::negative_size(what));
    }
    Ok(())
}
