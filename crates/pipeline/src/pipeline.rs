use crate::config::ReconstructionConfig;
use crate::error::Result;
use netsketch_graph::{TopologyAssembler, TopologyBuildContext, TopologyRecord, UnattachedNote};
use netsketch_model::{DetectionBatch, LinkId, ZoneId};
use netsketch_ocr::{OcrEngine, ShardedRecognizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Everything one run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionReport {
    pub topology: TopologyRecord,

    /// Text and detections that could not be placed
    #[serde(default)]
    pub unattached: Vec<UnattachedNote>,

    /// Links touching fewer than two equipment zones
    #[serde(default)]
    pub dangling_links: Vec<LinkId>,

    /// Connected groups of zones; more than one means the drawing is split
    #[serde(default)]
    pub islands: Vec<Vec<ZoneId>>,
}

/// detection batch -> OCR fan-out -> association -> assembly
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ReconstructionConfig,
}

impl Pipeline {
    pub fn new(config: ReconstructionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Reconstruct one diagram. Any error aborts the run; no partial
    /// topology is returned.
    pub async fn run(
        &self,
        batch: &DetectionBatch,
        engine: Arc<dyn OcrEngine>,
    ) -> Result<ReconstructionReport> {
        let started = Instant::now();

        let regions = batch.ocr_regions();
        log::info!(
            "Recognising text in {} regions over {} shards",
            regions.len(),
            self.config.ocr_shards
        );
        let recognizer = ShardedRecognizer::new(
            engine,
            self.config.ocr_shards,
            self.config.min_ocr_confidence,
        );
        let recognized = recognizer.recognize_all(regions).await?;

        log::info!("Associating text and links with equipment");
        let ctx = TopologyBuildContext::build(batch, &recognized, &self.config.association())?;

        log::info!("Assembling topology");
        let assembly = TopologyAssembler::new(self.config.default_host_interface.as_str())
            .assemble(&ctx);

        let islands = ctx.zone_graph.islands();
        if islands.len() > 1 {
            log::warn!("Diagram splits into {} disconnected groups", islands.len());
        }
        log::info!(
            "Reconstructed {} devices in {:.2?}",
            assembly.record.len(),
            started.elapsed()
        );

        Ok(ReconstructionReport {
            topology: assembly.record,
            unattached: assembly.notes,
            dangling_links: ctx.dangling_links,
            islands,
        })
    }
}
