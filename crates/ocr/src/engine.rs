use crate::error::Result;
use netsketch_model::{OcrReading, OcrRegion, RegionKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Text recognizer for one image region.
///
/// Implementations are called from blocking worker threads, one region at a
/// time per worker, and may be shared by several workers at once.
pub trait OcrEngine: Send + Sync {
    /// Readings with quads relative to the region's top-left corner
    fn recognize(&self, region: &OcrRegion) -> Result<Vec<OcrReading>>;
}

/// Pre-recorded readings for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionReadings {
    pub region: RegionKey,
    #[serde(default)]
    pub readings: Vec<OcrReading>,
}

/// Engine that answers from recorded readings.
///
/// Regions without a recording yield no text.
#[derive(Debug, Clone, Default)]
pub struct ReplayEngine {
    recorded: HashMap<RegionKey, Vec<OcrReading>>,
}

impl ReplayEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: Vec<RegionReadings>) -> Self {
        let mut engine = Self::new();
        for record in records {
            engine.record(record.region, record.readings);
        }
        engine
    }

    /// Append readings for `region`
    pub fn record(&mut self, region: RegionKey, readings: impl IntoIterator<Item = OcrReading>) {
        self.recorded.entry(region).or_default().extend(readings);
    }

    #[must_use]
    pub fn with(mut self, region: RegionKey, reading: OcrReading) -> Self {
        self.record(region, [reading]);
        self
    }
}

impl OcrEngine for ReplayEngine {
    fn recognize(&self, region: &OcrRegion) -> Result<Vec<OcrReading>> {
        Ok(self.recorded.get(&region.key).cloned().unwrap_or_default())
    }
}
