//! Shared error types for the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for stepmap operations
#[derive(Debug, Error)]
pub enum StepmapError {
    /// Source file could not be read
    #[error("failed to read source file {path}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file could not be parsed into a syntax tree
    #[error("failed to parse source file {path}")]
    Parse { path: PathBuf },

    /// Grammar could not be loaded into the parser
    #[error("tree-sitter error: {0}")]
    TreeSitter(String),

    /// A transition names a state that is declared nowhere in the unit
    #[error("failed to find step: {0}")]
    UnknownState(String),

    /// Neither entry state is declared in the unit
    #[error("no entry state: neither `{0}` nor `{1}` is declared")]
    MissingEntry(&'static str, &'static str),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StepmapError>;
