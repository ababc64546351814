//! # Netsketch Model
//!
//! Records exchanged between the stages of one reconstruction run.
//!
//! ## Contents
//!
//! - **Detections**: equipment zones, link strokes and text zones as
//!   reported by the object detector, gathered in a validated
//!   [`DetectionBatch`]
//! - **OCR records**: regions sent to the OCR engine, the raw readings it
//!   returns, and the [`TextFragment`]s kept after filtering
//! - **Ids**: detector-assigned newtypes, so a zone id cannot be passed where
//!   a link id is expected
//!
//! A batch is built once per diagram and never mutated; derived relations
//! (which link touches which zone, which text belongs where) live in the
//! graph crate's build context.

mod detection;
mod error;
mod ocr;
mod types;

pub use detection::{BatchParts, DetectionBatch, EquipmentZone, Link, TextZone};
pub use error::{ModelError, Result};
pub use ocr::{OcrReading, OcrRegion, TextFragment};
pub use types::{DeviceKind, FragmentId, LinkId, RegionKey, TextRole, TextZoneId, ZoneId};
