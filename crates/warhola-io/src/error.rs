//! Error types for codec and canvas operations.

use std::io;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Pixel buffer error.
    #[error(transparent)]
    Core(#[from] warhola_core::Error),

    /// Operator error.
    #[error(transparent)]
    Ops(#[from] warhola_ops::OpsError),

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Canvas configuration rejected by the builder.
    #[error("invalid canvas: {0}")]
    InvalidCanvas(String),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
