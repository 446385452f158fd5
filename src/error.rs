use thiserror::Error;

/// Error taxonomy for the filing pipeline.
///
/// Only `TickerNotFound` is fatal to a company analysis: without a resolved
/// identity there is nothing to locate. Every other failure mode degrades
/// inside the pipeline (an empty locate result, an omitted download, or a
/// synthetic extraction record) and is logged rather than propagated.
#[derive(Error, Debug)]
pub enum FilingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Ticker {0} not found in registry snapshot")]
    TickerNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("XML parsing error: {0}")]
    XmlError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<quick_xml::DeError> for FilingError {
    fn from(error: quick_xml::DeError) -> Self {
        FilingError::XmlError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FilingError>;
