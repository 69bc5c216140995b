//! Keymap extraction

use std::fmt;

use unpacker_abc::{ConstantPool, Instruction, Opcode};

use crate::error::{Result, UnpackError};

/// The obfuscation alphabet: char accessors return one of its bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keymap(String);

impl Keymap {
    /// Wrap a known alphabet
    pub fn new(keymap: impl Into<String>) -> Self {
        Self(keymap.into())
    }

    /// Take the first string pushed by `instructions`.
    ///
    /// Empty when nothing is pushed.
    pub fn extract(instructions: &[Instruction], constants: &ConstantPool) -> Result<Self> {
        let Some(push) = instructions.iter().find(|i| i.is(Opcode::PushString)) else {
            tracing::warn!("no string constant in static initializer, keymap is empty");
            return Ok(Self::default());
        };

        let index = push.operand(0).unwrap_or(0);
        let keymap = constants
            .strings
            .get(index as usize)
            .ok_or(UnpackError::StringIndex {
                index,
                len: constants.strings.len(),
            })?;

        tracing::debug!(keymap = %keymap, "resolved keymap");
        Ok(Self(keymap.clone()))
    }

    /// Byte at `index`
    pub fn get(&self, index: u8) -> Result<u8> {
        self.0
            .as_bytes()
            .get(usize::from(index))
            .copied()
            .ok_or(UnpackError::KeymapIndex {
                index,
                len: self.0.len(),
            })
    }

    /// Alphabet as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no alphabet was found
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Keymap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
