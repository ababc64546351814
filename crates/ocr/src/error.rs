use netsketch_model::{ModelError, RegionKey};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OcrError>;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine failed on {region}: {message}")]
    Engine { region: RegionKey, message: String },

    #[error("Region submitted twice: {0}")]
    DuplicateRegion(RegionKey),

    #[error("OCR worker panicked: {0}")]
    WorkerPanic(String),

    #[error("Merged {actual} region results, expected {expected}")]
    MergeMismatch { expected: usize, actual: usize },

    #[error("Malformed OCR output: {0}")]
    Model(#[from] ModelError),
}

impl OcrError {
    pub fn engine(region: RegionKey, message: impl Into<String>) -> Self {
        Self::Engine {
            region,
            message: message.into(),
        }
    }
}
