//! Error types for the signature pad

use thiserror::Error;

/// Result type alias for pad operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, exporting or compositing signatures
#[derive(Error, Debug)]
pub enum Error {
    /// Requested export format is not on the whitelist
    #[error("The image type {requested:?} is not supported. Supported types: {supported}")]
    UnsupportedFormat { requested: String, supported: String },

    /// Engine-backed operation invoked before the pad was mounted
    #[error("Signature pad is not initialized, mount it before use")]
    NotInitialized,

    /// A layer could not be loaded or decoded during composition
    #[error("Image composition failed: {0}")]
    Composition(String),

    /// A data URI could not be parsed
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    /// Encoding the canvas failed
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Decoding an image onto the canvas failed
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// A color string is not valid CSS
    #[error("Unrecognized color {value:?}: {reason}")]
    InvalidColor { value: String, reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// File system access failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<png::EncodingError> for Error {
    fn from(err: png::EncodingError) -> Self {
        Error::Encode(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
