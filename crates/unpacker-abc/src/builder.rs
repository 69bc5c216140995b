//! Method body assembly

use crate::instruction::Opcode;
use crate::writer::ByteWriter;

/// Assembles method body code byte by byte.
///
/// Emit helpers return `&mut Self` so sequences chain:
/// `code.get_local_0().call_property(7, 0).add()`.
#[derive(Debug, Default)]
pub struct CodeBuilder {
    out: ByteWriter,
}

impl CodeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the next instruction will be emitted at
    #[inline]
    pub fn current_offset(&self) -> usize {
        self.out.len()
    }

    /// Code emitted so far
    pub fn as_bytes(&self) -> &[u8] {
        self.out.as_bytes()
    }

    /// Finish and take the code bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.out.into_bytes()
    }

    // ── emit helpers ──

    /// Emit a raw opcode byte without operands
    pub fn op(&mut self, byte: u8) -> &mut Self {
        self.out.write_u8(byte);
        self
    }

    /// `getlocal0`
    pub fn get_local_0(&mut self) -> &mut Self {
        self.op(Opcode::GET_LOCAL_0)
    }

    /// `callproperty index, arg_count`
    pub fn call_property(&mut self, index: u32, arg_count: u32) -> &mut Self {
        self.op(Opcode::CALL_PROPERTY);
        self.out.write_u30(index);
        self.out.write_u30(arg_count);
        self
    }

    /// `add`
    pub fn add(&mut self) -> &mut Self {
        self.op(Opcode::ADD)
    }

    /// `pushbyte value`
    pub fn push_byte(&mut self, value: u8) -> &mut Self {
        self.op(Opcode::PUSH_BYTE);
        self.out.write_u8(value);
        self
    }

    /// `pushstring index`
    pub fn push_string(&mut self, index: u32) -> &mut Self {
        self.op(Opcode::PUSH_STRING);
        self.out.write_u30(index);
        self
    }

    /// `constructsuper arg_count`
    pub fn construct_super(&mut self, arg_count: u32) -> &mut Self {
        self.op(Opcode::CONSTRUCT_SUPER);
        self.out.write_u30(arg_count);
        self
    }

    /// `jump offset`
    pub fn jump(&mut self, offset: i32) -> &mut Self {
        self.op(0x10);
        self.out.write_s24(offset);
        self
    }

    /// `pushscope`
    pub fn push_scope(&mut self) -> &mut Self {
        self.op(0x30)
    }

    /// `pop`
    pub fn pop(&mut self) -> &mut Self {
        self.op(0x29)
    }

    /// `returnvalue`
    pub fn return_value(&mut self) -> &mut Self {
        self.op(0x48)
    }

    /// `returnvoid`
    pub fn return_void(&mut self) -> &mut Self {
        self.op(0x47)
    }
}
