//! String chain walker
//!
//! Obfuscated strings are spelled as chains of self-calls to char
//! accessors joined by `add`:
//!
//! ```text
//! getlocal0
//! callproperty <accessor>, 0
//! getlocal0
//! callproperty <accessor>, 0
//! add
//! ...
//! ```
//!
//! A `getlocal0`/`callproperty` pair is a call-unit. The walker moves a
//! cursor over a decoded method body and reads these chains back as bytes
//! without evaluating the operand stack.

use unpacker_abc::{Instruction, MultinameIndex, Opcode};

use crate::charmap::CharMap;
use crate::error::{Result, UnpackError};

/// One decoded call-unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallUnit {
    /// Called property
    pub name: MultinameIndex,
    /// Address of the `callproperty`
    pub address: u32,
    /// Byte the accessor returns, absent when it is not in the char map
    pub byte: Option<u8>,
}

/// Cursor over an instruction sequence, paired with a char map
#[derive(Debug)]
pub struct StringChainWalker<'a> {
    instructions: &'a [Instruction],
    chars: &'a CharMap,
    pos: usize,
    strict: bool,
}

impl<'a> StringChainWalker<'a> {
    /// Create a walker at the first instruction
    pub fn new(instructions: &'a [Instruction], chars: &'a CharMap) -> Self {
        Self {
            instructions,
            chars,
            pos: 0,
            strict: false,
        }
    }

    /// Fail on calls that are not in the char map instead of dropping them
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Cursor position in instructions
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Address of the instruction under the cursor
    pub fn address(&self) -> Option<u32> {
        self.current().map(|i| i.address)
    }

    /// Whether the cursor is past the last instruction
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.instructions.len()
    }

    #[inline]
    fn current(&self) -> Option<&'a Instruction> {
        self.instructions.get(self.pos)
    }

    #[inline]
    fn at(&self, opcode: Opcode) -> bool {
        self.current().is_some_and(|i| i.is(opcode))
    }

    /// Move just past the next `opcode`; stays at the end when there is none
    pub fn seek_past(&mut self, opcode: Opcode) -> bool {
        match self.instructions[self.pos.min(self.instructions.len())..]
            .iter()
            .position(|i| i.is(opcode))
        {
            Some(offset) => {
                self.pos += offset + 1;
                true
            }
            None => {
                self.pos = self.instructions.len();
                false
            }
        }
    }

    /// At the start of a call-unit
    pub fn is_string(&self) -> bool {
        self.at(Opcode::GetLocal0)
            && self
                .instructions
                .get(self.pos + 1)
                .is_some_and(|i| i.is(Opcode::CallProperty))
    }

    /// At a call-unit or at an `add` that may continue a chain
    pub fn is_add_string(&self) -> bool {
        self.at(Opcode::Add) || self.is_string()
    }

    /// Advance to the next call-unit; stays put when already at one
    pub fn next_string(&mut self) -> bool {
        while !self.is_at_end() {
            if self.is_string() {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    /// Consume the next call-unit of the current chain.
    ///
    /// Leading `add`s are consumed even when no call-unit follows them.
    pub fn next_char(&mut self) -> Option<CallUnit> {
        if !self.is_add_string() {
            return None;
        }
        while self.at(Opcode::Add) {
            self.pos += 1;
        }
        if !self.is_string() {
            return None;
        }

        let call = &self.instructions[self.pos + 1];
        let name = MultinameIndex(call.operand(0).unwrap_or(0));
        self.pos += 2;
        Some(CallUnit {
            name,
            address: call.address,
            byte: self.chars.get(name),
        })
    }

    /// Consume the rest of the current chain without decoding it
    pub fn skip_string(&mut self) {
        while self.next_char().is_some() {}
    }

    /// Decode the next chain.
    ///
    /// Calls missing from the char map are dropped, or rejected in strict
    /// mode.
    pub fn build(&mut self) -> Result<Vec<u8>> {
        if !self.is_string() {
            self.next_string();
        }

        let mut bytes = Vec::new();
        while let Some(unit) = self.next_char() {
            match unit.byte {
                Some(byte) => bytes.push(byte),
                None if self.strict => {
                    return Err(UnpackError::UnmappedAccessor {
                        name: unit.name,
                        address: unit.address,
                    });
                }
                None => tracing::trace!(name = unit.name.0, "dropped unmapped call"),
            }
        }
        Ok(bytes)
    }

    /// Compare the current chain against `target`.
    ///
    /// On a mismatch the rest of the chain is skipped.
    pub fn match_target(&mut self, target: &[u8]) -> bool {
        for expected in target {
            match self.next_char() {
                Some(CallUnit {
                    byte: Some(byte), ..
                }) if byte == *expected => {}
                _ => {
                    self.skip_string();
                    return false;
                }
            }
        }
        true
    }
}
