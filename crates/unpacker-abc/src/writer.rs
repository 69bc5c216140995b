//! ABC binary writer

use crate::class::{Class, Instance, Metadata, Script, Trait, TraitKind};
use crate::constant::{ConstantPool, Multiname};
use crate::file::AbcFile;
use crate::method::{Method, MethodBody, MethodFlags};

/// Growable byte buffer with the ABC integer encodings
#[derive(Debug, Default)]
pub(crate) struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub(crate) fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub(crate) fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_s24(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes()[..3]);
    }

    pub(crate) fn write_d64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub(crate) fn write_u30(&mut self, mut value: u32) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub(crate) fn write_s32(&mut self, mut value: i32) {
        for _ in 0..5 {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
            if done {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn write_string(&mut self, value: &str) {
        self.write_u30(value.len() as u32);
        self.write_bytes(value.as_bytes());
    }

    fn write_list<T: Copy>(&mut self, items: &[T], index: impl Fn(T) -> u32) {
        self.write_u30(items.len() as u32);
        for item in items {
            self.write_u30(index(*item));
        }
    }
}

/// Serializes an [`AbcFile`]
pub(crate) struct AbcWriter {
    out: ByteWriter,
}

impl AbcWriter {
    pub(crate) fn new() -> Self {
        Self {
            out: ByteWriter::new(),
        }
    }

    pub(crate) fn write(mut self, file: &AbcFile) -> Vec<u8> {
        self.out.write_u16(file.minor_version);
        self.out.write_u16(file.major_version);
        self.write_constant_pool(&file.constants);

        self.out.write_u30(file.methods.len() as u32);
        for method in &file.methods {
            self.write_method(method);
        }

        self.out.write_u30(file.metadata.len() as u32);
        for metadata in &file.metadata {
            self.write_metadata(metadata);
        }

        self.out.write_u30(file.instances.len() as u32);
        for instance in &file.instances {
            self.write_instance(instance);
        }
        for class in &file.classes {
            self.write_class(class);
        }

        self.out.write_u30(file.scripts.len() as u32);
        for script in &file.scripts {
            self.write_script(script);
        }

        let bodies: Vec<(usize, &MethodBody)> = file
            .methods
            .iter()
            .enumerate()
            .filter_map(|(index, method)| method.body.as_ref().map(|body| (index, body)))
            .collect();
        self.out.write_u30(bodies.len() as u32);
        for (index, body) in bodies {
            self.write_method_body(index as u32, body);
        }

        self.out.into_bytes()
    }

    /// Table length including the implicit entry, 0 when the table is empty
    fn write_table_len(&mut self, len: usize) {
        self.out.write_u30(if len <= 1 { 0 } else { len as u32 });
    }

    fn write_constant_pool(&mut self, pool: &ConstantPool) {
        self.write_table_len(pool.ints.len());
        for value in pool.ints.iter().skip(1) {
            self.out.write_s32(*value);
        }
        self.write_table_len(pool.uints.len());
        for value in pool.uints.iter().skip(1) {
            self.out.write_u30(*value);
        }
        self.write_table_len(pool.doubles.len());
        for value in pool.doubles.iter().skip(1) {
            self.out.write_d64(*value);
        }
        self.write_table_len(pool.strings.len());
        for value in pool.strings.iter().skip(1) {
            self.out.write_string(value);
        }
        self.write_table_len(pool.namespaces.len());
        for ns in pool.namespaces.iter().skip(1) {
            self.out.write_u8(ns.kind);
            self.out.write_u30(ns.name.0);
        }
        self.write_table_len(pool.namespace_sets.len());
        for set in pool.namespace_sets.iter().skip(1) {
            self.out.write_list(set, |ns| ns);
        }
        self.write_table_len(pool.multinames.len());
        for multiname in pool.multinames.iter().skip(1) {
            self.write_multiname(multiname);
        }
    }

    fn write_multiname(&mut self, multiname: &Multiname) {
        let kind = |plain: u8, attr: u8, attribute: bool| if attribute { attr } else { plain };
        match multiname {
            Multiname::QName {
                namespace,
                name,
                attribute,
            } => {
                self.out.write_u8(kind(0x07, 0x0D, *attribute));
                self.out.write_u30(*namespace);
                self.out.write_u30(name.0);
            }
            Multiname::RtqName { name, attribute } => {
                self.out.write_u8(kind(0x0F, 0x10, *attribute));
                self.out.write_u30(name.0);
            }
            Multiname::RtqNameL { attribute } => {
                self.out.write_u8(kind(0x11, 0x12, *attribute));
            }
            Multiname::Multiname {
                name,
                namespace_set,
                attribute,
            } => {
                self.out.write_u8(kind(0x09, 0x0E, *attribute));
                self.out.write_u30(name.0);
                self.out.write_u30(*namespace_set);
            }
            Multiname::MultinameL {
                namespace_set,
                attribute,
            } => {
                self.out.write_u8(kind(0x1B, 0x1C, *attribute));
                self.out.write_u30(*namespace_set);
            }
            Multiname::TypeName { base, parameters } => {
                self.out.write_u8(0x1D);
                self.out.write_u30(base.0);
                self.out.write_list(parameters, |p| p.0);
            }
        }
    }

    fn write_method(&mut self, method: &Method) {
        self.out.write_u30(method.param_types.len() as u32);
        self.out.write_u30(method.return_type.0);
        for param in &method.param_types {
            self.out.write_u30(param.0);
        }
        self.out.write_u30(method.name.0);
        self.out.write_u8(method.flags.0);

        if method.flags.contains(MethodFlags::HAS_OPTIONAL) {
            self.out.write_u30(method.options.len() as u32);
            for option in &method.options {
                self.out.write_u30(option.value);
                self.out.write_u8(option.kind);
            }
        }
        if method.flags.contains(MethodFlags::HAS_PARAM_NAMES) {
            for name in &method.param_names {
                self.out.write_u30(name.0);
            }
        }
    }

    fn write_metadata(&mut self, metadata: &Metadata) {
        self.out.write_u30(metadata.name);
        self.out.write_u30(metadata.items.len() as u32);
        for (key, _) in &metadata.items {
            self.out.write_u30(*key);
        }
        for (_, value) in &metadata.items {
            self.out.write_u30(*value);
        }
    }

    fn write_instance(&mut self, instance: &Instance) {
        self.out.write_u30(instance.name.0);
        self.out.write_u30(instance.super_name.0);
        self.out.write_u8(instance.flags);
        if instance.flags & Instance::PROTECTED_NS != 0 {
            self.out.write_u30(instance.protected_namespace.unwrap_or(0));
        }
        self.out.write_list(&instance.interfaces, |i| i.0);
        self.out.write_u30(instance.iinit.0);
        self.write_traits(&instance.traits);
    }

    fn write_class(&mut self, class: &Class) {
        self.out.write_u30(class.cinit.0);
        self.write_traits(&class.traits);
    }

    fn write_script(&mut self, script: &Script) {
        self.out.write_u30(script.init.0);
        self.write_traits(&script.traits);
    }

    fn write_method_body(&mut self, method: u32, body: &MethodBody) {
        self.out.write_u30(method);
        self.out.write_u30(body.max_stack);
        self.out.write_u30(body.local_count);
        self.out.write_u30(body.init_scope_depth);
        self.out.write_u30(body.max_scope_depth);
        self.out.write_u30(body.code.len() as u32);
        self.out.write_bytes(&body.code);

        self.out.write_u30(body.exceptions.len() as u32);
        for exception in &body.exceptions {
            self.out.write_u30(exception.from);
            self.out.write_u30(exception.to);
            self.out.write_u30(exception.target);
            self.out.write_u30(exception.exception_type.0);
            self.out.write_u30(exception.variable_name.0);
        }
        self.write_traits(&body.traits);
    }

    fn write_traits(&mut self, traits: &[Trait]) {
        self.out.write_u30(traits.len() as u32);
        for t in traits {
            self.write_trait(t);
        }
    }

    fn write_trait(&mut self, t: &Trait) {
        self.out.write_u30(t.name.0);
        self.out.write_u8((t.attributes << 4) | t.kind.code());

        match &t.kind {
            TraitKind::Slot {
                slot_id,
                type_name,
                value,
            }
            | TraitKind::Const {
                slot_id,
                type_name,
                value,
            } => {
                self.out.write_u30(*slot_id);
                self.out.write_u30(type_name.0);
                match value {
                    Some((index, kind)) => {
                        self.out.write_u30(*index);
                        self.out.write_u8(*kind);
                    }
                    None => self.out.write_u30(0),
                }
            }
            TraitKind::Method { disp_id, method }
            | TraitKind::Getter { disp_id, method }
            | TraitKind::Setter { disp_id, method } => {
                self.out.write_u30(*disp_id);
                self.out.write_u30(method.0);
            }
            TraitKind::Class { slot_id, class } => {
                self.out.write_u30(*slot_id);
                self.out.write_u30(*class);
            }
            TraitKind::Function { slot_id, function } => {
                self.out.write_u30(*slot_id);
                self.out.write_u30(function.0);
            }
        }

        if t.attributes & Trait::ATTR_METADATA != 0 {
            self.out.write_list(&t.metadata, |m| m);
        }
    }
}
