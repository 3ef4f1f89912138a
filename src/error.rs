//! The error type shared by every fallible operation in bibcite.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CiteError {
    /// The bibliography text could not be parsed. Carries the parser's own
    /// error unchanged.
    #[error("error parsing the bibliography—{0}")]
    Parse(biblatex::ParseError),

    /// A key registered for a function does not exist in the bibliography.
    #[error("{key} not in bibliography, but occurs for {signature}")]
    UnknownKey { key: String, signature: String },

    /// A key that could never be a bibtex citation key.
    #[error("invalid citation key `{0}`")]
    InvalidKey(String),

    #[error("error accessing the file {}—{source}", path.to_string_lossy())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error deserializing the configuration—{0}")]
    Config(String),

    #[error("error serializing the citations—{0}")]
    Json(#[from] serde_json::Error),

    #[error("error setting up the logger—{0}")]
    Logging(String),
}
