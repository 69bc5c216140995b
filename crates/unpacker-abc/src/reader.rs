//! ABC binary reader

use crate::class::{Class, Instance, Metadata, Script, Trait, TraitKind};
use crate::constant::{ConstantPool, Multiname, Namespace};
use crate::error::{BytecodeError, Result};
use crate::file::AbcFile;
use crate::method::{Exception, Method, MethodBody, MethodFlags, OptionalValue};
use crate::operand::{MethodIndex, MultinameIndex, StringIndex};

/// Little-endian cursor over a byte slice with the ABC integer encodings
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(BytecodeError::UnexpectedEnd)?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_s24(&mut self) -> Result<i32> {
        let b = self.read_bytes(3)?;
        let raw = u32::from(b[0]) | (u32::from(b[1]) << 8) | (u32::from(b[2]) << 16);
        Ok(((raw << 8) as i32) >> 8)
    }

    pub(crate) fn read_d64(&mut self) -> Result<f64> {
        let b = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(f64::from_le_bytes(raw))
    }

    /// Base-128 integer, returns the value and the number of bytes used
    fn read_varint(&mut self) -> Result<(u32, u32)> {
        let start = self.pos;
        let mut value = 0u32;
        for i in 0..5 {
            let byte = self.read_u8()?;
            value |= u32::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok((value, i + 1));
            }
        }
        Err(BytecodeError::InvalidInteger(start))
    }

    pub(crate) fn read_u30(&mut self) -> Result<u32> {
        Ok(self.read_varint()?.0)
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        self.read_u30()
    }

    pub(crate) fn read_s32(&mut self) -> Result<i32> {
        let (value, len) = self.read_varint()?;
        let bits = 7 * len;
        if bits >= 32 {
            return Ok(value as i32);
        }
        let shift = 32 - bits;
        Ok(((value << shift) as i32) >> shift)
    }

    pub(crate) fn read_string(&mut self) -> Result<String> {
        let len = self.read_u30()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn read_index_list<T: From<u32>>(&mut self, count: u32) -> Result<Vec<T>> {
        (0..count).map(|_| self.read_u30().map(T::from)).collect()
    }
}

/// Parses a complete `abcFile` structure
pub(crate) struct AbcReader<'a> {
    input: ByteReader<'a>,
}

impl<'a> AbcReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            input: ByteReader::new(bytes),
        }
    }

    pub(crate) fn read(mut self) -> Result<AbcFile> {
        let minor_version = self.input.read_u16()?;
        let major_version = self.input.read_u16()?;
        let constants = self.read_constant_pool()?;

        let method_count = self.input.read_u30()?;
        let mut methods = (0..method_count)
            .map(|_| self.read_method())
            .collect::<Result<Vec<_>>>()?;

        let metadata_count = self.input.read_u30()?;
        let metadata = (0..metadata_count)
            .map(|_| self.read_metadata())
            .collect::<Result<Vec<_>>>()?;

        let class_count = self.input.read_u30()?;
        let instances = (0..class_count)
            .map(|_| self.read_instance())
            .collect::<Result<Vec<_>>>()?;
        let classes = (0..class_count)
            .map(|_| self.read_class())
            .collect::<Result<Vec<_>>>()?;

        let script_count = self.input.read_u30()?;
        let scripts = (0..script_count)
            .map(|_| self.read_script())
            .collect::<Result<Vec<_>>>()?;

        let body_count = self.input.read_u30()?;
        for _ in 0..body_count {
            let (method, body) = self.read_method_body()?;
            let len = methods.len();
            let slot = methods
                .get_mut(method.0 as usize)
                .ok_or_else(|| BytecodeError::out_of_range("method", method.0, len))?;
            slot.body = Some(body);
        }

        tracing::trace!(
            methods = methods.len(),
            classes = classes.len(),
            scripts = scripts.len(),
            "read abc file"
        );

        Ok(AbcFile {
            minor_version,
            major_version,
            constants,
            methods,
            metadata,
            instances,
            classes,
            scripts,
        })
    }

    /// Entry count of a constant table; the implicit entry 0 is not stored
    fn read_table_len(&mut self) -> Result<u32> {
        Ok(self.input.read_u30()?.saturating_sub(1))
    }

    fn read_constant_pool(&mut self) -> Result<ConstantPool> {
        let mut pool = ConstantPool::new();

        for _ in 0..self.read_table_len()? {
            pool.ints.push(self.input.read_s32()?);
        }
        for _ in 0..self.read_table_len()? {
            pool.uints.push(self.input.read_u32()?);
        }
        for _ in 0..self.read_table_len()? {
            pool.doubles.push(self.input.read_d64()?);
        }
        for _ in 0..self.read_table_len()? {
            pool.strings.push(self.input.read_string()?);
        }
        for _ in 0..self.read_table_len()? {
            let kind = self.input.read_u8()?;
            let name = StringIndex(self.input.read_u30()?);
            pool.namespaces.push(Namespace { kind, name });
        }
        for _ in 0..self.read_table_len()? {
            let count = self.input.read_u30()?;
            let set = self.input.read_index_list(count)?;
            pool.namespace_sets.push(set);
        }
        for _ in 0..self.read_table_len()? {
            let multiname = self.read_multiname()?;
            pool.multinames.push(multiname);
        }

        Ok(pool)
    }

    fn read_multiname(&mut self) -> Result<Multiname> {
        let kind = self.input.read_u8()?;
        let multiname = match kind {
            0x07 | 0x0D => Multiname::QName {
                namespace: self.input.read_u30()?,
                name: StringIndex(self.input.read_u30()?),
                attribute: kind == 0x0D,
            },
            0x0F | 0x10 => Multiname::RtqName {
                name: StringIndex(self.input.read_u30()?),
                attribute: kind == 0x10,
            },
            0x11 | 0x12 => Multiname::RtqNameL {
                attribute: kind == 0x12,
            },
            0x09 | 0x0E => Multiname::Multiname {
                name: StringIndex(self.input.read_u30()?),
                namespace_set: self.input.read_u30()?,
                attribute: kind == 0x0E,
            },
            0x1B | 0x1C => Multiname::MultinameL {
                namespace_set: self.input.read_u30()?,
                attribute: kind == 0x1C,
            },
            0x1D => {
                let base = MultinameIndex(self.input.read_u30()?);
                let count = self.input.read_u30()?;
                Multiname::TypeName {
                    base,
                    parameters: self.input.read_index_list(count)?,
                }
            }
            other => return Err(BytecodeError::InvalidMultinameKind(other)),
        };
        Ok(multiname)
    }

    fn read_method(&mut self) -> Result<Method> {
        let param_count = self.input.read_u30()?;
        let return_type = MultinameIndex(self.input.read_u30()?);
        let param_types = self.input.read_index_list(param_count)?;
        let name = StringIndex(self.input.read_u30()?);
        let flags = MethodFlags(self.input.read_u8()?);

        let mut options = Vec::new();
        if flags.contains(MethodFlags::HAS_OPTIONAL) {
            let count = self.input.read_u30()?;
            for _ in 0..count {
                let value = self.input.read_u30()?;
                let kind = self.input.read_u8()?;
                options.push(OptionalValue { value, kind });
            }
        }

        let param_names = if flags.contains(MethodFlags::HAS_PARAM_NAMES) {
            self.input.read_index_list(param_count)?
        } else {
            Vec::new()
        };

        Ok(Method {
            param_types,
            return_type,
            name,
            flags,
            options,
            param_names,
            body: None,
        })
    }

    fn read_metadata(&mut self) -> Result<Metadata> {
        let name = self.input.read_u30()?;
        let count = self.input.read_u30()?;
        let keys: Vec<u32> = self.input.read_index_list(count)?;
        let values: Vec<u32> = self.input.read_index_list(count)?;
        Ok(Metadata {
            name,
            items: keys.into_iter().zip(values).collect(),
        })
    }

    fn read_instance(&mut self) -> Result<Instance> {
        let name = MultinameIndex(self.input.read_u30()?);
        let super_name = MultinameIndex(self.input.read_u30()?);
        let flags = self.input.read_u8()?;
        let protected_namespace = if flags & Instance::PROTECTED_NS != 0 {
            Some(self.input.read_u30()?)
        } else {
            None
        };
        let interface_count = self.input.read_u30()?;
        let interfaces = self.input.read_index_list(interface_count)?;
        let iinit = MethodIndex(self.input.read_u30()?);
        let traits = self.read_traits()?;

        Ok(Instance {
            name,
            super_name,
            flags,
            protected_namespace,
            interfaces,
            iinit,
            traits,
        })
    }

    fn read_class(&mut self) -> Result<Class> {
        let cinit = MethodIndex(self.input.read_u30()?);
        let traits = self.read_traits()?;
        Ok(Class { cinit, traits })
    }

    fn read_script(&mut self) -> Result<Script> {
        let init = MethodIndex(self.input.read_u30()?);
        let traits = self.read_traits()?;
        Ok(Script { init, traits })
    }

    fn read_method_body(&mut self) -> Result<(MethodIndex, MethodBody)> {
        let method = MethodIndex(self.input.read_u30()?);
        let max_stack = self.input.read_u30()?;
        let local_count = self.input.read_u30()?;
        let init_scope_depth = self.input.read_u30()?;
        let max_scope_depth = self.input.read_u30()?;
        let code_len = self.input.read_u30()? as usize;
        let code = self.input.read_bytes(code_len)?.to_vec();

        let exception_count = self.input.read_u30()?;
        let exceptions = (0..exception_count)
            .map(|_| {
                Ok(Exception {
                    from: self.input.read_u30()?,
                    to: self.input.read_u30()?,
                    target: self.input.read_u30()?,
                    exception_type: MultinameIndex(self.input.read_u30()?),
                    variable_name: MultinameIndex(self.input.read_u30()?),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let traits = self.read_traits()?;

        Ok((
            method,
            MethodBody {
                max_stack,
                local_count,
                init_scope_depth,
                max_scope_depth,
                code,
                exceptions,
                traits,
            },
        ))
    }

    fn read_traits(&mut self) -> Result<Vec<Trait>> {
        let count = self.input.read_u30()?;
        (0..count).map(|_| self.read_trait()).collect()
    }

    fn read_trait(&mut self) -> Result<Trait> {
        let name = MultinameIndex(self.input.read_u30()?);
        let kind_byte = self.input.read_u8()?;
        let attributes = kind_byte >> 4;

        let kind = match kind_byte & 0x0F {
            code @ (0 | 6) => {
                let slot_id = self.input.read_u30()?;
                let type_name = MultinameIndex(self.input.read_u30()?);
                let index = self.input.read_u30()?;
                let value = if index != 0 {
                    Some((index, self.input.read_u8()?))
                } else {
                    None
                };
                if code == 0 {
                    TraitKind::Slot {
                        slot_id,
                        type_name,
                        value,
                    }
                } else {
                    TraitKind::Const {
                        slot_id,
                        type_name,
                        value,
                    }
                }
            }
            code @ (1..=3) => {
                let disp_id = self.input.read_u30()?;
                let method = MethodIndex(self.input.read_u30()?);
                match code {
                    1 => TraitKind::Method { disp_id, method },
                    2 => TraitKind::Getter { disp_id, method },
                    _ => TraitKind::Setter { disp_id, method },
                }
            }
            4 => TraitKind::Class {
                slot_id: self.input.read_u30()?,
                class: self.input.read_u30()?,
            },
            5 => TraitKind::Function {
                slot_id: self.input.read_u30()?,
                function: MethodIndex(self.input.read_u30()?),
            },
            other => return Err(BytecodeError::InvalidTraitKind(other)),
        };

        let metadata = if attributes & Trait::ATTR_METADATA != 0 {
            let count = self.input.read_u30()?;
            self.input.read_index_list(count)?
        } else {
            Vec::new()
        };

        Ok(Trait {
            name,
            kind,
            attributes,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_u30() {
        let mut r = ByteReader::new(&[0x7F, 0x80, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
        assert_eq!(r.read_u30().unwrap(), 0x7F);
        assert_eq!(r.read_u30().unwrap(), 0x80);
        assert_eq!(r.read_u30().unwrap(), u32::MAX);
        assert!(r.is_at_end());
    }

    #[test]
    fn test_read_s32_sign_extension() {
        let mut r = ByteReader::new(&[0x7F, 0x40, 0x3F, 0x80, 0x7F]);
        assert_eq!(r.read_s32().unwrap(), -1);
        assert_eq!(r.read_s32().unwrap(), -64);
        assert_eq!(r.read_s32().unwrap(), 63);
        assert_eq!(r.read_s32().unwrap(), -128);
    }

    #[test]
    fn test_read_s24() {
        let mut r = ByteReader::new(&[0xFE, 0xFF, 0xFF, 0x10, 0x00, 0x00]);
        assert_eq!(r.read_s24().unwrap(), -2);
        assert_eq!(r.read_s24().unwrap(), 16);
    }

    #[test]
    fn test_overlong_varint() {
        let mut r = ByteReader::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
        assert!(matches!(r.read_u30(), Err(BytecodeError::InvalidInteger(0))));
    }

    #[test]
    fn test_unexpected_end() {
        let mut r = ByteReader::new(&[0x05, b'a', b'b']);
        assert!(matches!(r.read_string(), Err(BytecodeError::UnexpectedEnd)));
    }

    #[test]
    fn test_body_for_unknown_method() {
        // version, empty pool, no methods/metadata/classes/scripts, one body for method 4
        let bytes = [
            0x10, 0x00, 0x2E, 0x00, // minor, major
            0, 0, 0, 0, 0, 0, 0, // constant pool
            0, 0, 0, 0, // methods, metadata, classes, scripts
            1, 4, 1, 1, 0, 1, 0, 0, 0, 0, // one body
        ];
        let err = AbcReader::new(&bytes).read().unwrap_err();
        assert!(matches!(
            err,
            BytecodeError::IndexOutOfRange { table: "method", index: 4, len: 0 }
        ));
    }
}
