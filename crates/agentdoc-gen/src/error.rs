//! Error types for document generation.

use std::path::PathBuf;

use agentdoc_core::ScanError;
use thiserror::Error;

/// Errors that can occur while generating a document.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No API key was configured for the model.
    #[error("No API key configured for the language model")]
    MissingApiKey,

    /// Invalid model or prompt configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Transport-level failure talking to the model.
    #[error("Request to language model failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The model endpoint answered with a non-success status.
    #[error("Language model returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The model answered without any text.
    #[error("Language model returned an empty response")]
    EmptyResponse,

    /// Writing the generated document failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Scanning the folder failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}
