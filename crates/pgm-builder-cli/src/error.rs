//! Error type of the CLI.

use std::{io, ops::Range};

use thiserror::Error;

use pgm_builder::PgmError;

use crate::config::ConfigError;

/// Everything that can go wrong between reading a document and writing its diagram.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The document is not valid TOML or does not describe a diagram.
    #[error("invalid document: {message}")]
    Document {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },

    #[error(transparent)]
    Pgm(#[from] PgmError),

    #[error("failed to serialize diagram: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    /// Wraps a document parse error together with the document source.
    pub fn new_document_error(err: toml::de::Error, src: impl Into<String>) -> Self {
        Self::Document {
            message: err.message().to_string(),
            span: err.span(),
            src: src.into(),
        }
    }
}
