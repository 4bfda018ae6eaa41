//! Error types for engine operations.

use thiserror::Error;

/// Error type for engine operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Blend mode name not in the fixed list.
    #[error("unknown blend mode: {0:?}")]
    UnknownBlendMode(String),

    /// Channel configuration count differs from the data.
    #[error("channel count mismatch: {layers} layers vs {configs} channel configs")]
    ChannelCountMismatch {
        /// Number of channel layers supplied
        layers: usize,
        /// Number of channel configs supplied
        configs: usize,
    },

    /// Planes have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from the core buffers (bounds, shapes).
    #[error(transparent)]
    Core(#[from] stackview_core::Error),
}

/// Result type for engine operations.
pub type OpsResult<T> = Result<T, OpsError>;
