use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolvencyError {
    /// The converter never produced a markup file for this document. Distinct from a
    /// document that converted fine but yielded sparse financial data.
    #[error("Extraction unavailable for document '{document}': no converted markup found (searched {searched:?})")]
    ExtractionUnavailable {
        document: String,
        searched: Vec<PathBuf>,
    },

    #[error("Invalid line item code '{0}': expected exactly four ASCII digits")]
    InvalidLineItemCode(String),

    #[error("Invalid score band for '{ratio}': {details}")]
    InvalidScoreBand { ratio: String, details: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolvencyError>;
