//! Error types for I/O operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid or corrupted file.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected size.
        expected: String,
        /// Actual size.
        actual: String,
    },

    /// Unsupported sample type or bit depth.
    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(String),

    /// Parse error (metadata, settings, layout strings).
    #[error("parse error: {0}")]
    Parse(String),

    /// Error from the core buffers.
    #[error(transparent)]
    Core(#[from] stackview_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
