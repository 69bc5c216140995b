//! Unpacking errors

use thiserror::Error;
use unpacker_abc::{BytecodeError, MultinameIndex};

/// Errors that can occur while resolving or writing the resources
#[derive(Debug, Error)]
pub enum UnpackError {
    /// The movie has no `DoABC` block named `frame1`
    #[error("This movie file does not have a frame1")]
    MissingFrame1,

    /// No string constant in the static initializer (strict mode)
    #[error("Cannot resolve methods: keymap was not found")]
    MissingKeymap,

    /// A char accessor pushes a byte past the end of the keymap
    #[error("Index error in keymap: {index} (len {len})")]
    KeymapIndex {
        /// Pushed byte
        index: u8,
        /// Keymap length
        len: usize,
    },

    /// A call in a chain names no char accessor (strict mode)
    #[error("Unmapped accessor {name:?} at address {address}")]
    UnmappedAccessor {
        /// Called property
        name: MultinameIndex,
        /// Address of the call
        address: u32,
    },

    /// `pushstring` operand outside the string table
    #[error("String index {index} out of range (len {len})")]
    StringIndex {
        /// Operand
        index: u32,
        /// String table length
        len: usize,
    },

    /// A decoded resource name is not UTF-8
    #[error("Invalid resource name: {0}")]
    InvalidName(#[from] std::string::FromUtf8Error),

    /// Bytecode error
    #[error("ABC error: {0}")]
    Abc(#[from] BytecodeError),

    /// IO error while writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for unpacking operations
pub type Result<T> = std::result::Result<T, UnpackError>;
