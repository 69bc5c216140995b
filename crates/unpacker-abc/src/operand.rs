//! Table indices used across the ABC model

use serde::{Deserialize, Serialize};

/// Index into the multiname table of the constant pool
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct MultinameIndex(pub u32);

impl MultinameIndex {
    /// Create a new multiname index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get index value
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<u32> for MultinameIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// Index into the string table of the constant pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct StringIndex(pub u32);

impl StringIndex {
    /// Create a new string index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get index value
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<u32> for StringIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// Index into the method table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MethodIndex(pub u32);

impl MethodIndex {
    /// Create a new method index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get index value
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl From<u32> for MethodIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiname_index() {
        let m = MultinameIndex::new(17);
        assert_eq!(m.index(), 17);
        assert_eq!(MultinameIndex::from(17), m);
    }

    #[test]
    fn test_method_index() {
        let m = MethodIndex::new(1000);
        assert_eq!(m.index(), 1000);
    }
}
