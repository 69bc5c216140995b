//! Movie errors

use thiserror::Error;
use unpacker_abc::BytecodeError;

/// Errors that can occur while retrieving or reading a movie
#[derive(Debug, Error)]
pub enum MovieError {
    /// The first three bytes are not a known signature
    #[error("Invalid signature: {0:?}")]
    InvalidSignature([u8; 3]),

    /// Known signature with a compression scheme we cannot decode
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(&'static str),

    /// Input ended inside a header or tag
    #[error("Unexpected end of movie data")]
    UnexpectedEnd,

    /// The compressed body could not be inflated
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// A `DoABC` payload failed to parse
    #[error("ABC error: {0}")]
    Abc(#[from] BytecodeError),

    /// Download failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for movie operations
pub type Result<T> = std::result::Result<T, MovieError>;
