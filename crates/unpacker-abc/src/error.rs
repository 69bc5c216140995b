//! Bytecode errors

use thiserror::Error;

/// Errors that can occur while reading or decoding ABC data
#[derive(Debug, Error)]
pub enum BytecodeError {
    /// Unknown opcode byte in a method body
    #[error("Invalid opcode 0x{opcode:02x} at offset {offset}")]
    InvalidOpcode {
        /// The raw opcode byte
        opcode: u8,
        /// Byte offset of the instruction in the method body
        offset: usize,
    },

    /// Unknown trait kind
    #[error("Invalid trait kind: {0}")]
    InvalidTraitKind(u8),

    /// Unknown multiname kind
    #[error("Invalid multiname kind: 0x{0:02x}")]
    InvalidMultinameKind(u8),

    /// Variable-length integer longer than five bytes
    #[error("Invalid variable-length integer at offset {0}")]
    InvalidInteger(usize),

    /// Unexpected end of bytecode
    #[error("Unexpected end of bytecode")]
    UnexpectedEnd,

    /// A table index that does not point at an entry
    #[error("{table} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Name of the indexed table
        table: &'static str,
        /// The offending index
        index: u32,
        /// Number of entries in the table
        len: usize,
    },

    /// IO error while reading or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BytecodeError {
    pub(crate) fn out_of_range(table: &'static str, index: u32, len: usize) -> Self {
        Self::IndexOutOfRange { table, index, len }
    }
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
