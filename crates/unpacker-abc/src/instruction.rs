//! Bytecode instructions (opcodes)
//!
//! Only the handful of opcodes the unpacker pattern-matches on get their own
//! [`Opcode`] variant. Every other AVM2 opcode decodes to [`Opcode::Other`]
//! carrying the raw byte; its operands are still decoded so that instruction
//! boundaries and addresses stay exact.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Bytecode opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Push local register 0 (`this`)
    GetLocal0,
    /// Call a property: operands `index:u30`, `arg_count:u30`
    CallProperty,
    /// Add the two top stack values
    Add,
    /// Push a byte immediate: operand `value:u8`
    PushByte,
    /// Push a string constant: operand `index:u30`
    PushString,
    /// Call the base class constructor: operand `arg_count:u30`
    ConstructSuper,
    /// Any other opcode, by raw byte
    Other(u8),
}

impl Opcode {
    /// Raw byte of `getlocal0`
    pub const GET_LOCAL_0: u8 = 0xD0;
    /// Raw byte of `callproperty`
    pub const CALL_PROPERTY: u8 = 0x46;
    /// Raw byte of `add`
    pub const ADD: u8 = 0xA0;
    /// Raw byte of `pushbyte`
    pub const PUSH_BYTE: u8 = 0x24;
    /// Raw byte of `pushstring`
    pub const PUSH_STRING: u8 = 0x2C;
    /// Raw byte of `constructsuper`
    pub const CONSTRUCT_SUPER: u8 = 0x49;

    /// Classify a raw opcode byte
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            Self::GET_LOCAL_0 => Self::GetLocal0,
            Self::CALL_PROPERTY => Self::CallProperty,
            Self::ADD => Self::Add,
            Self::PUSH_BYTE => Self::PushByte,
            Self::PUSH_STRING => Self::PushString,
            Self::CONSTRUCT_SUPER => Self::ConstructSuper,
            other => Self::Other(other),
        }
    }

    /// Raw opcode byte
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::GetLocal0 => Self::GET_LOCAL_0,
            Self::CallProperty => Self::CALL_PROPERTY,
            Self::Add => Self::ADD,
            Self::PushByte => Self::PUSH_BYTE,
            Self::PushString => Self::PUSH_STRING,
            Self::ConstructSuper => Self::CONSTRUCT_SUPER,
            Self::Other(byte) => byte,
        }
    }

    /// Mnemonic, or `"unknown"` for bytes that are not AVM2 opcodes
    pub fn name(self) -> &'static str {
        opcode_info(self.to_byte()).map_or("unknown", |(name, _)| name)
    }
}

/// Width of a single operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperandKind {
    U8,
    U30,
    S24,
}

/// Operand layout of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    Fixed(&'static [OperandKind]),
    /// `default:s24`, `case_count:u30`, then `case_count + 1` `s24` offsets
    LookupSwitch,
}

use OperandKind::{S24, U8, U30};

const NONE: Layout = Layout::Fixed(&[]);
const ONE_U8: Layout = Layout::Fixed(&[U8]);
const ONE_U30: Layout = Layout::Fixed(&[U30]);
const TWO_U30: Layout = Layout::Fixed(&[U30, U30]);
const BRANCH: Layout = Layout::Fixed(&[S24]);
const DEBUG: Layout = Layout::Fixed(&[U8, U30, U8, U30]);

/// Mnemonic and operand layout for every AVM2 opcode
pub(crate) fn opcode_info(byte: u8) -> Option<(&'static str, Layout)> {
    let info = match byte {
        0x01 => ("bkpt", NONE),
        0x02 => ("nop", NONE),
        0x03 => ("throw", NONE),
        0x04 => ("getsuper", ONE_U30),
        0x05 => ("setsuper", ONE_U30),
        0x06 => ("dxns", ONE_U30),
        0x07 => ("dxnslate", NONE),
        0x08 => ("kill", ONE_U30),
        0x09 => ("label", NONE),
        0x0C => ("ifnlt", BRANCH),
        0x0D => ("ifnle", BRANCH),
        0x0E => ("ifngt", BRANCH),
        0x0F => ("ifnge", BRANCH),
        0x10 => ("jump", BRANCH),
        0x11 => ("iftrue", BRANCH),
        0x12 => ("iffalse", BRANCH),
        0x13 => ("ifeq", BRANCH),
        0x14 => ("ifne", BRANCH),
        0x15 => ("iflt", BRANCH),
        0x16 => ("ifle", BRANCH),
        0x17 => ("ifgt", BRANCH),
        0x18 => ("ifge", BRANCH),
        0x19 => ("ifstricteq", BRANCH),
        0x1A => ("ifstrictne", BRANCH),
        0x1B => ("lookupswitch", Layout::LookupSwitch),
        0x1C => ("pushwith", NONE),
        0x1D => ("popscope", NONE),
        0x1E => ("nextname", NONE),
        0x1F => ("hasnext", NONE),
        0x20 => ("pushnull", NONE),
        0x21 => ("pushundefined", NONE),
        0x23 => ("nextvalue", NONE),
        0x24 => ("pushbyte", ONE_U8),
        0x25 => ("pushshort", ONE_U30),
        0x26 => ("pushtrue", NONE),
        0x27 => ("pushfalse", NONE),
        0x28 => ("pushnan", NONE),
        0x29 => ("pop", NONE),
        0x2A => ("dup", NONE),
        0x2B => ("swap", NONE),
        0x2C => ("pushstring", ONE_U30),
        0x2D => ("pushint", ONE_U30),
        0x2E => ("pushuint", ONE_U30),
        0x2F => ("pushdouble", ONE_U30),
        0x30 => ("pushscope", NONE),
        0x31 => ("pushnamespace", ONE_U30),
        0x32 => ("hasnext2", TWO_U30),
        0x35 => ("li8", NONE),
        0x36 => ("li16", NONE),
        0x37 => ("li32", NONE),
        0x38 => ("lf32", NONE),
        0x39 => ("lf64", NONE),
        0x3A => ("si8", NONE),
        0x3B => ("si16", NONE),
        0x3C => ("si32", NONE),
        0x3D => ("sf32", NONE),
        0x3E => ("sf64", NONE),
        0x40 => ("newfunction", ONE_U30),
        0x41 => ("call", ONE_U30),
        0x42 => ("construct", ONE_U30),
        0x43 => ("callmethod", TWO_U30),
        0x44 => ("callstatic", TWO_U30),
        0x45 => ("callsuper", TWO_U30),
        0x46 => ("callproperty", TWO_U30),
        0x47 => ("returnvoid", NONE),
        0x48 => ("returnvalue", NONE),
        0x49 => ("constructsuper", ONE_U30),
        0x4A => ("constructprop", TWO_U30),
        0x4C => ("callproplex", TWO_U30),
        0x4E => ("callsupervoid", TWO_U30),
        0x4F => ("callpropvoid", TWO_U30),
        0x50 => ("sxi1", NONE),
        0x51 => ("sxi8", NONE),
        0x52 => ("sxi16", NONE),
        0x53 => ("applytype", ONE_U30),
        0x55 => ("newobject", ONE_U30),
        0x56 => ("newarray", ONE_U30),
        0x57 => ("newactivation", NONE),
        0x58 => ("newclass", ONE_U30),
        0x59 => ("getdescendants", ONE_U30),
        0x5A => ("newcatch", ONE_U30),
        0x5D => ("findpropstrict", ONE_U30),
        0x5E => ("findproperty", ONE_U30),
        0x5F => ("finddef", ONE_U30),
        0x60 => ("getlex", ONE_U30),
        0x61 => ("setproperty", ONE_U30),
        0x62 => ("getlocal", ONE_U30),
        0x63 => ("setlocal", ONE_U30),
        0x64 => ("getglobalscope", NONE),
        0x65 => ("getscopeobject", ONE_U8),
        0x66 => ("getproperty", ONE_U30),
        0x67 => ("getouterscope", ONE_U30),
        0x68 => ("initproperty", ONE_U30),
        0x6A => ("deleteproperty", ONE_U30),
        0x6C => ("getslot", ONE_U30),
        0x6D => ("setslot", ONE_U30),
        0x6E => ("getglobalslot", ONE_U30),
        0x6F => ("setglobalslot", ONE_U30),
        0x70 => ("convert_s", NONE),
        0x71 => ("esc_xelem", NONE),
        0x72 => ("esc_xattr", NONE),
        0x73 => ("convert_i", NONE),
        0x74 => ("convert_u", NONE),
        0x75 => ("convert_d", NONE),
        0x76 => ("convert_b", NONE),
        0x77 => ("convert_o", NONE),
        0x78 => ("checkfilter", NONE),
        0x80 => ("coerce", ONE_U30),
        0x81 => ("coerce_b", NONE),
        0x82 => ("coerce_a", NONE),
        0x83 => ("coerce_i", NONE),
        0x84 => ("coerce_d", NONE),
        0x85 => ("coerce_s", NONE),
        0x86 => ("astype", ONE_U30),
        0x87 => ("astypelate", NONE),
        0x88 => ("coerce_u", NONE),
        0x89 => ("coerce_o", NONE),
        0x90 => ("negate", NONE),
        0x91 => ("increment", NONE),
        0x92 => ("inclocal", ONE_U30),
        0x93 => ("decrement", NONE),
        0x94 => ("declocal", ONE_U30),
        0x95 => ("typeof", NONE),
        0x96 => ("not", NONE),
        0x97 => ("bitnot", NONE),
        0xA0 => ("add", NONE),
        0xA1 => ("subtract", NONE),
        0xA2 => ("multiply", NONE),
        0xA3 => ("divide", NONE),
        0xA4 => ("modulo", NONE),
        0xA5 => ("lshift", NONE),
        0xA6 => ("rshift", NONE),
        0xA7 => ("urshift", NONE),
        0xA8 => ("bitand", NONE),
        0xA9 => ("bitor", NONE),
        0xAA => ("bitxor", NONE),
        0xAB => ("equals", NONE),
        0xAC => ("strictequals", NONE),
        0xAD => ("lessthan", NONE),
        0xAE => ("lessequals", NONE),
        0xAF => ("greaterthan", NONE),
        0xB0 => ("greaterequals", NONE),
        0xB1 => ("instanceof", NONE),
        0xB2 => ("istype", ONE_U30),
        0xB3 => ("istypelate", NONE),
        0xB4 => ("in", NONE),
        0xC0 => ("increment_i", NONE),
        0xC1 => ("decrement_i", NONE),
        0xC2 => ("inclocal_i", ONE_U30),
        0xC3 => ("declocal_i", ONE_U30),
        0xC4 => ("negate_i", NONE),
        0xC5 => ("add_i", NONE),
        0xC6 => ("subtract_i", NONE),
        0xC7 => ("multiply_i", NONE),
        0xD0 => ("getlocal0", NONE),
        0xD1 => ("getlocal1", NONE),
        0xD2 => ("getlocal2", NONE),
        0xD3 => ("getlocal3", NONE),
        0xD4 => ("setlocal0", NONE),
        0xD5 => ("setlocal1", NONE),
        0xD6 => ("setlocal2", NONE),
        0xD7 => ("setlocal3", NONE),
        0xEF => ("debug", DEBUG),
        0xF0 => ("debugline", ONE_U30),
        0xF1 => ("debugfile", ONE_U30),
        0xF2 => ("bkptline", ONE_U30),
        0xF3 => ("timestamp", NONE),
        _ => return None,
    };
    Some(info)
}

/// A decoded instruction.
///
/// `s24` branch offsets are stored in two's complement; read them back with
/// `operand as i32`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Byte offset of the instruction within its method body
    pub address: u32,
    /// The opcode
    pub opcode: Opcode,
    /// Operands in encoding order
    pub operands: Vec<u32>,
}

impl Instruction {
    /// Create an instruction at address 0
    pub fn new(opcode: Opcode, operands: impl Into<Vec<u32>>) -> Self {
        Self::at(0, opcode, operands)
    }

    /// Create an instruction at a given address
    pub fn at(address: u32, opcode: Opcode, operands: impl Into<Vec<u32>>) -> Self {
        Self {
            address,
            opcode,
            operands: operands.into(),
        }
    }

    /// Get an operand by position
    #[inline]
    pub fn operand(&self, index: usize) -> Option<u32> {
        self.operands.get(index).copied()
    }

    /// Check the opcode
    #[inline]
    pub fn is(&self, opcode: Opcode) -> bool {
        self.opcode == opcode
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}: {}", self.address, self.opcode.name())?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for byte in 0..=u8::MAX {
            assert_eq!(Opcode::from_byte(byte).to_byte(), byte);
        }
    }

    #[test]
    fn test_named_opcodes() {
        assert_eq!(Opcode::from_byte(0xD0), Opcode::GetLocal0);
        assert_eq!(Opcode::from_byte(0x46), Opcode::CallProperty);
        assert_eq!(Opcode::from_byte(0x4F), Opcode::Other(0x4F));
    }

    #[test]
    fn test_opcode_name() {
        assert_eq!(Opcode::ConstructSuper.name(), "constructsuper");
        assert_eq!(Opcode::Other(0x4F).name(), "callpropvoid");
        assert_eq!(Opcode::Other(0x00).name(), "unknown");
    }

    #[test]
    fn test_display() {
        let ins = Instruction::at(12, Opcode::CallProperty, [7, 0]);
        assert_eq!(ins.to_string(), "    12: callproperty 7 0");
    }
}
