use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Malformed detector or OCR payloads. These abort the current diagram.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Duplicate {family} id: {id}")]
    DuplicateId { family: &'static str, id: u32 },

    #[error("Non-finite coordinates in {0}")]
    NonFinite(String),

    #[error("Negative size in {0}")]
    NegativeSize(String),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl ModelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn non_finite(what: impl Into<String>) -> Self {
        Self::NonFinite(what.into())
    }

    pub fn negative_size(what: impl Into<String>) -> Self {
        Self::NegativeSize(what.into())
    }
}
