//! The `abcFile` container

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::class::{Class, ClassDef, Instance, Metadata, Script};
use crate::constant::ConstantPool;
use crate::error::{BytecodeError, Result};
use crate::method::Method;
use crate::operand::{MethodIndex, MultinameIndex};
use crate::reader::AbcReader;
use crate::writer::AbcWriter;
use crate::{ABC_MAJOR_VERSION, ABC_MINOR_VERSION};

/// A parsed ABC file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcFile {
    /// Minor format version
    pub minor_version: u16,

    /// Major format version
    pub major_version: u16,

    /// Constant pool
    pub constants: ConstantPool,

    /// Methods; bodies are attached to their method
    pub methods: Vec<Method>,

    /// Metadata entries
    pub metadata: Vec<Metadata>,

    /// Instance halves of the classes
    pub instances: Vec<Instance>,

    /// Static halves of the classes, same length as `instances`
    pub classes: Vec<Class>,

    /// Scripts
    pub scripts: Vec<Script>,
}

impl AbcFile {
    /// Create a new file builder
    pub fn builder() -> AbcFileBuilder {
        AbcFileBuilder::new()
    }

    /// Parse from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        AbcReader::new(bytes).read()
    }

    /// Serialize to raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        AbcWriter::new().write(self)
    }

    /// Write to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read from a reader
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Number of classes
    #[inline]
    pub fn class_count(&self) -> usize {
        self.instances.len()
    }

    /// Get a class by index
    pub fn class(&self, index: usize) -> Result<ClassDef<'_>> {
        match (self.instances.get(index), self.classes.get(index)) {
            (Some(instance), Some(class)) => Ok(ClassDef { instance, class }),
            _ => Err(BytecodeError::out_of_range(
                "class",
                index as u32,
                self.instances.len(),
            )),
        }
    }

    /// Get a method by index
    pub fn method(&self, index: MethodIndex) -> Result<&Method> {
        self.methods
            .get(index.0 as usize)
            .ok_or_else(|| BytecodeError::out_of_range("method", index.0, self.methods.len()))
    }

    /// Local name of a class
    pub fn class_name(&self, index: usize) -> Option<&str> {
        let instance = self.instances.get(index)?;
        self.constants.multiname_name(instance.name)
    }
}

/// Builder for creating ABC files
#[derive(Debug)]
pub struct AbcFileBuilder {
    constants: ConstantPool,
    methods: Vec<Method>,
    instances: Vec<Instance>,
    classes: Vec<Class>,
    scripts: Vec<Script>,
}

impl Default for AbcFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AbcFileBuilder {
    /// Create a new file builder
    pub fn new() -> Self {
        Self {
            constants: ConstantPool::new(),
            methods: Vec::new(),
            instances: Vec::new(),
            classes: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Get mutable reference to constant pool
    pub fn constants_mut(&mut self) -> &mut ConstantPool {
        &mut self.constants
    }

    /// Add a method, returns its index
    pub fn add_method(&mut self, method: Method) -> MethodIndex {
        let idx = MethodIndex(self.methods.len() as u32);
        self.methods.push(method);
        idx
    }

    /// Add a class from both halves, returns its index
    pub fn add_class(&mut self, instance: Instance, class: Class) -> usize {
        self.instances.push(instance);
        self.classes.push(class);
        self.instances.len() - 1
    }

    /// Add a script
    pub fn script(mut self, script: Script) -> Self {
        self.scripts.push(script);
        self
    }

    /// Start an instance half named `name`, with no base class or traits.
    ///
    /// Fill in `iinit` and traits, then pass it to [`Self::add_class`].
    pub fn new_instance(&mut self, name: &str) -> Instance {
        let name = self.constants.add_qname(name);
        Instance {
            name,
            super_name: MultinameIndex(0),
            flags: 0,
            protected_namespace: None,
            interfaces: Vec::new(),
            iinit: MethodIndex(0),
            traits: Vec::new(),
        }
    }

    /// Build the file
    pub fn build(self) -> AbcFile {
        AbcFile {
            minor_version: ABC_MINOR_VERSION,
            major_version: ABC_MAJOR_VERSION,
            constants: self.constants,
            methods: self.methods,
            metadata: Vec::new(),
            instances: self.instances,
            classes: self.classes,
            scripts: self.scripts,
        }
    }
}
