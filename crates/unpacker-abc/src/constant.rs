//! Constant pool of an ABC file

use serde::{Deserialize, Serialize};

use crate::error::{BytecodeError, Result};
use crate::operand::{MultinameIndex, StringIndex};

/// A namespace entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace kind byte (package, private, protected, ...)
    pub kind: u8,
    /// Name of the namespace in the string table
    pub name: StringIndex,
}

/// A multiname entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Multiname {
    /// Qualified name (`0x07`, attribute form `0x0D`)
    QName {
        /// Namespace index
        namespace: u32,
        /// Name in the string table
        name: StringIndex,
        /// Attribute variant
        attribute: bool,
    },
    /// Runtime qualified name (`0x0F`, attribute form `0x10`)
    RtqName {
        /// Name in the string table
        name: StringIndex,
        /// Attribute variant
        attribute: bool,
    },
    /// Runtime qualified name, late-bound (`0x11`, attribute form `0x12`)
    RtqNameL {
        /// Attribute variant
        attribute: bool,
    },
    /// Multiple namespace name (`0x09`, attribute form `0x0E`)
    Multiname {
        /// Name in the string table
        name: StringIndex,
        /// Namespace set index
        namespace_set: u32,
        /// Attribute variant
        attribute: bool,
    },
    /// Late-bound multiple namespace name (`0x1B`, attribute form `0x1C`)
    MultinameL {
        /// Namespace set index
        namespace_set: u32,
        /// Attribute variant
        attribute: bool,
    },
    /// Parameterized type name (`0x1D`)
    TypeName {
        /// Base type
        base: MultinameIndex,
        /// Type parameters
        parameters: Vec<MultinameIndex>,
    },
}

impl Multiname {
    /// String table index of the local name, when the kind carries one
    pub fn name(&self) -> Option<StringIndex> {
        match self {
            Self::QName { name, .. } | Self::RtqName { name, .. } | Self::Multiname { name, .. } => {
                Some(*name)
            }
            _ => None,
        }
    }
}

/// Constant pool.
///
/// Every table keeps the implicit entry at index 0 so that indices found in
/// the bytecode address the vectors directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantPool {
    /// Signed integers
    pub ints: Vec<i32>,
    /// Unsigned integers
    pub uints: Vec<u32>,
    /// Doubles
    pub doubles: Vec<f64>,
    /// Strings
    pub strings: Vec<String>,
    /// Namespaces
    pub namespaces: Vec<Namespace>,
    /// Namespace sets
    pub namespace_sets: Vec<Vec<u32>>,
    /// Multinames
    pub multinames: Vec<Multiname>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    /// Create a pool holding only the implicit entries
    pub fn new() -> Self {
        Self {
            ints: vec![0],
            uints: vec![0],
            doubles: vec![0.0],
            strings: vec![String::new()],
            namespaces: vec![Namespace {
                kind: 0,
                name: StringIndex(0),
            }],
            namespace_sets: vec![Vec::new()],
            multinames: vec![Multiname::RtqNameL { attribute: false }],
        }
    }

    /// Add a string, returns its index
    ///
    /// Deduplicates identical strings.
    pub fn add_string(&mut self, s: &str) -> StringIndex {
        if let Some(idx) = self.strings.iter().skip(1).position(|existing| existing == s) {
            return StringIndex(idx as u32 + 1);
        }
        self.strings.push(s.to_owned());
        StringIndex(self.strings.len() as u32 - 1)
    }

    /// Add a public qualified name, returns its multiname index
    pub fn add_qname(&mut self, name: &str) -> MultinameIndex {
        let name = self.add_string(name);
        self.multinames.push(Multiname::QName {
            namespace: 0,
            name,
            attribute: false,
        });
        MultinameIndex(self.multinames.len() as u32 - 1)
    }

    /// Get a string by index
    #[inline]
    pub fn string(&self, index: StringIndex) -> Result<&str> {
        self.strings
            .get(index.0 as usize)
            .map(String::as_str)
            .ok_or_else(|| BytecodeError::out_of_range("string", index.0, self.strings.len()))
    }

    /// Get a multiname by index
    #[inline]
    pub fn multiname(&self, index: MultinameIndex) -> Result<&Multiname> {
        self.multinames
            .get(index.0 as usize)
            .ok_or_else(|| BytecodeError::out_of_range("multiname", index.0, self.multinames.len()))
    }

    /// Local name of a multiname, if it has one
    pub fn multiname_name(&self, index: MultinameIndex) -> Option<&str> {
        let name = self.multiname(index).ok()?.name()?;
        self.string(name).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_dedup() {
        let mut pool = ConstantPool::new();

        let idx1 = pool.add_string("hello");
        let idx2 = pool.add_string("world");
        let idx3 = pool.add_string("hello");

        assert_eq!(idx1, StringIndex(1));
        assert_eq!(idx2, StringIndex(2));
        assert_eq!(idx3, idx1);
        assert_eq!(pool.strings.len(), 3);
    }

    #[test]
    fn test_implicit_entries() {
        let pool = ConstantPool::new();
        assert_eq!(pool.string(StringIndex(0)).unwrap(), "");
        assert!(matches!(
            pool.string(StringIndex(1)),
            Err(BytecodeError::IndexOutOfRange { table: "string", index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_qname_lookup() {
        let mut pool = ConstantPool::new();
        let m = pool.add_qname("writeBytes");
        assert_eq!(pool.multiname_name(m), Some("writeBytes"));
        assert_eq!(pool.multiname_name(MultinameIndex(0)), None);
    }
}
