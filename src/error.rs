use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request failed with status {status}: {status_text}")]
    RequestFailed { status: u16, status_text: String },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("giving up on {identifier} after {attempts} attempts")]
    RetriesExhausted {
        identifier: String,
        attempts: u32,
        #[source]
        last: Box<CatalogError>,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}

impl CatalogError {
    /// Errors worth another attempt. A missing record or a malformed
    /// identifier will not change between attempts, but the retry policy still
    /// treats them as failures; this only feeds diagnostics.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Timeout { .. } | CatalogError::Transport(_) => true,
            CatalogError::RequestFailed { status, .. } => {
                matches!(status, 429 | 500 | 502 | 503 | 504)
            }
            CatalogError::RetriesExhausted { last, .. } => last.is_transient(),
            _ => false,
        }
    }

    /// The innermost error, unwrapping retry exhaustion.
    pub fn root_cause(&self) -> &CatalogError {
        match self {
            CatalogError::RetriesExhausted { last, .. } => last.root_cause(),
            other => other,
        }
    }
}
