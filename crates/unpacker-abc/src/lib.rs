//! # Unpacker ABC
//!
//! Model of ActionScript Byte Code (ABC), the payload of an SWF `DoABC` tag.
//!
//! ## Scope
//!
//! - **Complete reader/writer**: every table of an `abcFile` is parsed so that
//!   indices into the method and class tables resolve exactly
//! - **Flat instructions**: method bodies decode into an address-ordered
//!   list of [`Instruction`]s
//! - **Focused opcodes**: only the opcodes the unpacker pattern-matches on
//!   are named; all others are kept as [`Opcode::Other`]

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod class;
pub mod constant;
pub mod decoder;
pub mod error;
pub mod file;
pub mod instruction;
pub mod method;
pub mod operand;
mod reader;
mod writer;

pub use builder::CodeBuilder;
pub use class::{Class, ClassDef, Instance, Metadata, Script, Trait, TraitKind};
pub use constant::{ConstantPool, Multiname, Namespace};
pub use decoder::{InstructionDecoder, decode_code};
pub use error::BytecodeError;
pub use file::{AbcFile, AbcFileBuilder};
pub use instruction::{Instruction, Opcode};
pub use method::{Method, MethodBody, MethodBuilder, MethodFlags};
pub use operand::{MethodIndex, MultinameIndex, StringIndex};

/// Major version written by [`AbcFileBuilder`]
pub const ABC_MAJOR_VERSION: u16 = 46;

/// Minor version written by [`AbcFileBuilder`]
pub const ABC_MINOR_VERSION: u16 = 16;
