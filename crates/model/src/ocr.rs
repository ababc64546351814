use crate::error::{ModelError, Result};
use crate::types::{FragmentId, RegionKey};
use netsketch_classifier::TextClass;
use netsketch_geometry::{BoundingBox, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Image region handed to the OCR engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OcrRegion {
    pub key: RegionKey,
    pub bbox: BoundingBox,
}

/// Raw OCR engine output for one detection inside a region.
///
/// `quad` is relative to the region's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrReading {
    pub quad: [Point; 4],
    pub text: String,
    pub confidence: f64,
}

impl OcrReading {
    pub fn new(quad: [Point; 4], text: impl Into<String>, confidence: f64) -> Self {
        Self {
            quad,
            text: text.into(),
            confidence,
        }
    }

    /// Reject engine output that cannot be placed on the image
    pub fn validate(&self) -> Result<()> {
        if !self.confidence.is_finite() {
            return Err(ModelError::invalid(format!(
                "OCR confidence for {:?} is not a number",
                self.text
            )));
        }
        if !self.quad.iter().all(|p| p.is_finite()) {
            return Err(ModelError::non_finite(format!("OCR quad for {:?}", self.text)));
        }
        Ok(())
    }
}

/// One retained OCR observation, in image coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub id: FragmentId,
    pub text: String,
    pub confidence: f64,
    pub quad: [Point; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<TextClass>,
}

impl TextFragment {
    /// Axis-aligned envelope of the quad
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        let mut min = self.quad[0];
        let mut max = self.quad[0];
        for p in &self.quad[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        BoundingBox::from_corners(min, max)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Outline used for distance queries; `None` for degenerate quads
    #[must_use]
    pub fn polygon(&self) -> Option<Polygon> {
        self.bounds().polygon()
    }

    #[must_use]
    pub fn with_class(mut self, class: TextClass) -> Self {
        self.class = Some(class);
        self
    }
}
