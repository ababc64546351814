use netsketch_model::RegionKey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("OCR output for {0}, which is not in the detection batch")]
    UnknownRegion(RegionKey),

    #[error("Invalid association settings: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
