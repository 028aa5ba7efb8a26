use thiserror::Error;

/// Errors surfaced by index building, serialization and search.
#[derive(Error, Debug)]
pub enum FtsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Document not found: {0}")]
    DocumentNotFound(u64),

    #[error("Decode error in {section} section at offset {offset}: {reason}")]
    Decode {
        section: &'static str,
        offset: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, FtsError>;

impl FtsError {
    pub fn decode(section: &'static str, offset: usize, reason: impl Into<String>) -> Self {
        FtsError::Decode { section, offset, reason: reason.into() }
    }

    /// Decode failures on the lookup path are treated as an unknown term.
    pub fn is_decode(&self) -> bool {
        matches!(self, FtsError::Decode { .. })
    }
}
