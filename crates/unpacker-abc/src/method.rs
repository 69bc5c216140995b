//! Method signatures and bodies

use serde::{Deserialize, Serialize};

use crate::class::Trait;
use crate::decoder::decode_code;
use crate::error::Result;
use crate::instruction::Instruction;
use crate::operand::{MultinameIndex, StringIndex};

/// Method flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodFlags(pub u8);

impl MethodFlags {
    /// Uses the `arguments` object
    pub const NEED_ARGUMENTS: u8 = 0x01;
    /// Needs an activation object
    pub const NEED_ACTIVATION: u8 = 0x02;
    /// Takes a `...rest` parameter
    pub const NEED_REST: u8 = 0x04;
    /// Has optional parameters
    pub const HAS_OPTIONAL: u8 = 0x08;
    /// Sets the default XML namespace
    pub const SET_DXNS: u8 = 0x40;
    /// Carries parameter names
    pub const HAS_PARAM_NAMES: u8 = 0x80;

    /// Check a flag bit
    #[inline]
    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }
}

/// Default value of an optional parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalValue {
    /// Index into the constant table selected by `kind`
    pub value: u32,
    /// Constant kind byte
    pub kind: u8,
}

/// Exception handler of a method body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    /// Start of the protected range
    pub from: u32,
    /// End of the protected range
    pub to: u32,
    /// Handler address
    pub target: u32,
    /// Caught type
    pub exception_type: MultinameIndex,
    /// Name of the catch variable
    pub variable_name: MultinameIndex,
}

/// Body of a method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodBody {
    /// Operand stack high-water mark
    pub max_stack: u32,
    /// Number of local registers
    pub local_count: u32,
    /// Initial scope depth
    pub init_scope_depth: u32,
    /// Maximum scope depth
    pub max_scope_depth: u32,
    /// Raw code bytes
    pub code: Vec<u8>,
    /// Exception handlers
    pub exceptions: Vec<Exception>,
    /// Activation traits
    pub traits: Vec<Trait>,
}

impl MethodBody {
    /// Decode the code bytes into instructions
    pub fn instructions(&self) -> Result<Vec<Instruction>> {
        decode_code(&self.code)
    }
}

/// A method: signature plus optional body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Method {
    /// Parameter types (0 means `*`)
    pub param_types: Vec<MultinameIndex>,
    /// Return type (0 means `*`)
    pub return_type: MultinameIndex,
    /// Debug name
    pub name: StringIndex,
    /// Flags
    pub flags: MethodFlags,
    /// Optional parameter defaults
    pub options: Vec<OptionalValue>,
    /// Parameter names
    pub param_names: Vec<StringIndex>,
    /// Body, absent for native and interface methods
    pub body: Option<MethodBody>,
}

impl Method {
    /// Create a new method builder
    pub fn builder() -> MethodBuilder {
        MethodBuilder::new()
    }

    /// Whether the method takes a `...rest` parameter
    #[inline]
    pub fn need_rest(&self) -> bool {
        self.flags.contains(MethodFlags::NEED_REST)
    }

    /// Operand stack high-water mark, 0 without a body
    #[inline]
    pub fn max_stack(&self) -> u32 {
        self.body.as_ref().map_or(0, |body| body.max_stack)
    }

    /// Decode the body, empty without one
    pub fn instructions(&self) -> Result<Vec<Instruction>> {
        match &self.body {
            Some(body) => body.instructions(),
            None => Ok(Vec::new()),
        }
    }
}

/// Builder for creating methods
#[derive(Debug, Default)]
pub struct MethodBuilder {
    method: Method,
}

impl MethodBuilder {
    /// Create a new method builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug name
    pub fn name(mut self, name: StringIndex) -> Self {
        self.method.name = name;
        self
    }

    /// Add a parameter of type `*`
    pub fn param(mut self) -> Self {
        self.method.param_types.push(MultinameIndex(0));
        self
    }

    /// Mark as taking a `...rest` parameter
    pub fn need_rest(mut self, value: bool) -> Self {
        if value {
            self.method.flags.0 |= MethodFlags::NEED_REST;
        } else {
            self.method.flags.0 &= !MethodFlags::NEED_REST;
        }
        self
    }

    /// Attach a body built from raw code
    pub fn body(mut self, max_stack: u32, code: Vec<u8>) -> Self {
        self.method.body = Some(MethodBody {
            max_stack,
            local_count: 1,
            init_scope_depth: 0,
            max_scope_depth: 1,
            code,
            ..MethodBody::default()
        });
        self
    }

    /// Build the method
    pub fn build(self) -> Method {
        self.method
    }
}
