use crate::error::{PipelineError, Result};
use netsketch_graph::AssociationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for one reconstruction run.
///
/// Every key is optional in the TOML file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconstructionConfig {
    /// Zone <-> link "near" threshold, in image pixels
    pub link_attach_distance: f64,

    /// OCR readings below this confidence are discarded
    pub min_ocr_confidence: f64,

    /// Number of OCR fan-out shards
    pub ocr_shards: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_link_max_distance: Option<f64>,

    pub free_text_max_distance: f64,

    /// Interface name given to pc/server devices without an interface label
    pub default_host_interface: String,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        let association = AssociationConfig::default();
        Self {
            link_attach_distance: association.link_attach_distance,
            min_ocr_confidence: 0.5,
            ocr_shards: 3,
            label_link_max_distance: association.label_link_max_distance,
            free_text_max_distance: association.free_text_max_distance,
            default_host_interface: "eth0".to_string(),
        }
    }
}

impl ReconstructionConfig {
    pub fn validate(&self) -> Result<()> {
        self.association()
            .validate()
            .map_err(|err| PipelineError::config(err.to_string()))?;

        if !(0.0..=1.0).contains(&self.min_ocr_confidence) {
            return Err(PipelineError::config(format!(
                "min_ocr_confidence must be within [0, 1], got {}",
                self.min_ocr_confidence
            )));
        }
        if self.ocr_shards == 0 {
            return Err(PipelineError::config("ocr_shards must be at least 1"));
        }
        if self.default_host_interface.trim().is_empty() {
            return Err(PipelineError::config("default_host_interface must not be empty"));
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded reconstruction config from {}", path.display());
        Ok(config)
    }

    pub fn association(&self) -> AssociationConfig {
        AssociationConfig {
            link_attach_distance: self.link_attach_distance,
            label_link_max_distance: self.label_link_max_distance,
            free_text_max_distance: self.free_text_max_distance,
        }
    }
}
