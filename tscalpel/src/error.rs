//! Error types for tscalpel
//!
//! Defines crate-specific error types using thiserror for clear error
//! propagation. Dropped split points and skipped existing outputs are not
//! errors; they are reported as data and logged as warnings.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for tscalpel
#[derive(Error, Debug)]
pub enum Error {
    /// Structural inconsistency in the playlist file
    #[error("Malformed playlist: {0}")]
    MalformedPlaylist(String),

    /// A playlist mark refers to a play item that does not exist
    #[error(
        "Mark {mark} references play item {item}, but the playlist has {item_count} play items"
    )]
    Reference {
        mark: usize,
        item: usize,
        item_count: usize,
    },

    /// Invalid combination of run settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external trimming tool could not be located
    #[error("External tool '{0}' not found")]
    ExternalToolMissing(String),

    /// The external trimming tool ran but failed
    #[error("External tool failed on {path}: {message}")]
    ExternalTool { path: PathBuf, message: String },

    /// Audio stream read/write errors not covered by a backend error
    #[error("Audio error: {0}")]
    Audio(String),

    /// WAV backend errors
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Format probe errors
    #[error("Audio probe error: {0}")]
    Probe(#[from] symphonia::core::errors::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tscalpel_common::Error> for Error {
    fn from(err: tscalpel_common::Error) -> Self {
        match err {
            tscalpel_common::Error::Io(e) => Error::Io(e),
            tscalpel_common::Error::Config(msg) => Error::Config(msg),
            tscalpel_common::Error::InvalidInput(msg) => Error::Config(msg),
        }
    }
}

/// Convenience Result type using tscalpel Error
pub type Result<T> = std::result::Result<T, Error>;
