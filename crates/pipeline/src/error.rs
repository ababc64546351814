use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Detection input rejected: {0}")]
    Model(#[from] netsketch_model::ModelError),

    #[error("OCR failed: {0}")]
    Ocr(#[from] netsketch_ocr::OcrError),

    #[error("Association failed: {0}")]
    Graph(#[from] netsketch_graph::GraphError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config file is not valid TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Hostname {0:?} cannot be used as a file name")]
    InvalidHostname(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
