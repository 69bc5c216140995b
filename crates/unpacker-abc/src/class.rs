//! Traits, instances, classes and scripts

use serde::{Deserialize, Serialize};

use crate::operand::{MethodIndex, MultinameIndex};

/// Trait data by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitKind {
    /// Variable slot (`0`)
    Slot {
        /// Slot id
        slot_id: u32,
        /// Declared type
        type_name: MultinameIndex,
        /// Default value `(index, kind)`
        value: Option<(u32, u8)>,
    },
    /// Method (`1`)
    Method {
        /// Dispatch id
        disp_id: u32,
        /// Method table index
        method: MethodIndex,
    },
    /// Getter (`2`)
    Getter {
        /// Dispatch id
        disp_id: u32,
        /// Method table index
        method: MethodIndex,
    },
    /// Setter (`3`)
    Setter {
        /// Dispatch id
        disp_id: u32,
        /// Method table index
        method: MethodIndex,
    },
    /// Class (`4`)
    Class {
        /// Slot id
        slot_id: u32,
        /// Class table index
        class: u32,
    },
    /// Function (`5`)
    Function {
        /// Slot id
        slot_id: u32,
        /// Method table index
        function: MethodIndex,
    },
    /// Constant slot (`6`)
    Const {
        /// Slot id
        slot_id: u32,
        /// Declared type
        type_name: MultinameIndex,
        /// Value `(index, kind)`
        value: Option<(u32, u8)>,
    },
}

impl TraitKind {
    /// Kind number as encoded in the low nibble
    pub const fn code(&self) -> u8 {
        match self {
            Self::Slot { .. } => 0,
            Self::Method { .. } => 1,
            Self::Getter { .. } => 2,
            Self::Setter { .. } => 3,
            Self::Class { .. } => 4,
            Self::Function { .. } => 5,
            Self::Const { .. } => 6,
        }
    }
}

/// A trait of a class, instance, script or activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trait {
    /// Name of the trait
    pub name: MultinameIndex,
    /// Kind-specific data
    pub kind: TraitKind,
    /// Attribute bits (high nibble of the kind byte)
    pub attributes: u8,
    /// Metadata indices
    pub metadata: Vec<u32>,
}

impl Trait {
    /// Final attribute
    pub const ATTR_FINAL: u8 = 0x1;
    /// Override attribute
    pub const ATTR_OVERRIDE: u8 = 0x2;
    /// Metadata attribute
    pub const ATTR_METADATA: u8 = 0x4;

    /// Create a plain method trait
    pub fn method(name: MultinameIndex, method: MethodIndex) -> Self {
        Self {
            name,
            kind: TraitKind::Method { disp_id: 0, method },
            attributes: 0,
            metadata: Vec::new(),
        }
    }

    /// Method index of a `Method` trait; getters and setters do not count
    pub fn as_method(&self) -> Option<MethodIndex> {
        match self.kind {
            TraitKind::Method { method, .. } => Some(method),
            _ => None,
        }
    }
}

/// Instance half of a class definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Class name
    pub name: MultinameIndex,
    /// Base class name
    pub super_name: MultinameIndex,
    /// Class flags
    pub flags: u8,
    /// Protected namespace, present when `flags & 0x08`
    pub protected_namespace: Option<u32>,
    /// Implemented interfaces
    pub interfaces: Vec<MultinameIndex>,
    /// Instance initializer (constructor)
    pub iinit: MethodIndex,
    /// Instance traits
    pub traits: Vec<Trait>,
}

impl Instance {
    /// Protected namespace flag
    pub const PROTECTED_NS: u8 = 0x08;
}

/// Static half of a class definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    /// Static initializer
    pub cinit: MethodIndex,
    /// Static traits
    pub traits: Vec<Trait>,
}

/// A script entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Script initializer
    pub init: MethodIndex,
    /// Script traits
    pub traits: Vec<Trait>,
}

/// A metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Metadata name
    pub name: u32,
    /// Key/value string index pairs
    pub items: Vec<(u32, u32)>,
}

/// Borrowed view of one class: both halves joined by index
#[derive(Debug, Clone, Copy)]
pub struct ClassDef<'a> {
    /// Instance half
    pub instance: &'a Instance,
    /// Static half
    pub class: &'a Class,
}

impl<'a> ClassDef<'a> {
    /// Instance traits
    #[inline]
    pub fn itraits(&self) -> &'a [Trait] {
        &self.instance.traits
    }

    /// Static initializer
    #[inline]
    pub fn cinit(&self) -> MethodIndex {
        self.class.cinit
    }

    /// Instance initializer
    #[inline]
    pub fn iinit(&self) -> MethodIndex {
        self.instance.iinit
    }
}
