//! Error types for kanji_lookup

use thiserror::Error;

/// Errors surfaced to callers of the recognizer.
///
/// Degenerate ink (no strokes, empty strokes, zero variance) is not an error;
/// only structurally malformed input and I/O problems end up here.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("stroke {stroke}, point {point}: expected an (x, y) pair, got {len} values")]
    MalformedPoint {
        stroke: usize,
        point: usize,
        len: usize,
    },

    #[error("stroke {stroke}, point {point}: coordinate is not finite")]
    NonFiniteCoordinate { stroke: usize, point: usize },

    #[error("reference entry {index} is malformed: {reason}")]
    MalformedEntry { index: usize, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("a reference database has already been installed")]
    DatabaseAlreadyInstalled,

    #[error("no reference database has been installed")]
    DatabaseNotInstalled,
}

impl From<toml::de::Error> for LookupError {
    fn from(e: toml::de::Error) -> Self {
        LookupError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
