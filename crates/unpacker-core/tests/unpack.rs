use unpacker_abc::{
    AbcFile, BytecodeError, Class, CodeBuilder, Method, MultinameIndex, Script, Trait,
};
use unpacker_core::{ResolveOptions, UnpackError, Unpacker};
use unpacker_movie::{Compression, Movie, MovieBuilder};

const KEYMAP: &str = "abcdefghijklmnopqrstuvwxyzBW";

/// Class whose constructor writes `order` through obfuscated string chains
struct PackedClass {
    builder: unpacker_abc::AbcFileBuilder,
    accessors: Vec<MultinameIndex>,
    write_call: u32,
}

impl PackedClass {
    fn new() -> Self {
        let mut builder = AbcFile::builder();
        let accessors = (0..KEYMAP.len())
            .map(|i| builder.constants_mut().add_qname(&format!("\u{a7}{i}\u{a7}")))
            .collect();
        let write_call = builder.constants_mut().add_qname("dynamic").0;
        Self {
            builder,
            accessors,
            write_call,
        }
    }

    fn chain(&self, code: &mut CodeBuilder, s: &str) {
        for (i, c) in s.bytes().enumerate() {
            let index = KEYMAP.bytes().position(|k| k == c).expect("char in keymap");
            code.get_local_0().call_property(self.accessors[index].0, 0);
            if i > 0 {
                code.add();
            }
        }
    }

    fn build(mut self, keymap: Option<&str>, order: &[&str]) -> AbcFile {
        let mut traits = Vec::new();
        for (i, name) in self.accessors.clone().into_iter().enumerate() {
            let mut code = CodeBuilder::new();
            code.get_local_0().push_scope().push_byte(i as u8).return_value();
            let method = self.builder.add_method(
                Method::builder()
                    .need_rest(true)
                    .body(2, code.into_bytes())
                    .build(),
            );
            traits.push(Trait::method(name, method));
        }

        // same shape but a wider stack, not an accessor
        let mut code = CodeBuilder::new();
        code.push_byte(0).return_value();
        let decoy = self
            .builder
            .add_method(Method::builder().need_rest(true).body(3, code.into_bytes()).build());
        let decoy_name = self.builder.constants_mut().add_qname("decoy");
        traits.push(Trait::method(decoy_name, decoy));

        let mut code = CodeBuilder::new();
        code.get_local_0().push_scope();
        if let Some(keymap) = keymap {
            let index = self.builder.constants_mut().add_string(keymap);
            code.push_string(index.0).pop();
        }
        code.return_void();
        let cinit = self.builder.add_method(Method::builder().body(1, code.into_bytes()).build());

        let mut code = CodeBuilder::new();
        code.get_local_0().push_scope().get_local_0().construct_super(0);
        for name in order {
            code.get_local_0();
            self.chain(&mut code, "writeBytes");
            self.chain(&mut code, name);
            code.call_property(self.write_call, 1).pop();
        }
        code.return_void();
        let iinit = self.builder.add_method(Method::builder().body(4, code.into_bytes()).build());

        let mut instance = self.builder.new_instance("Main");
        instance.iinit = iinit;
        instance.traits = traits;
        self.builder.add_class(
            instance,
            Class {
                cinit,
                traits: Vec::new(),
            },
        );

        self.builder
            .script(Script {
                init: cinit,
                traits: Vec::new(),
            })
            .build()
    }
}

fn packed_movie(compression: Compression, keymap: Option<&str>, order: &[&str]) -> Movie {
    let abc = PackedClass::new().build(keymap, order);
    let bytes = MovieBuilder::new()
        .compression(compression)
        .do_abc("frame1", &abc)
        .binary_data(1, b"ICONS|")
        .binary_data(2, b"SOUNDS|")
        .binary_data(3, b"MAPS|")
        .symbol(1, "Transformice_icons")
        .symbol(2, "Transformice_sounds")
        .symbol(3, "maps")
        .to_bytes()
        .unwrap();
    Movie::from_buffer(&bytes).unwrap()
}

#[test]
fn test_unpack_in_constructor_order() {
    let movie = packed_movie(Compression::Zlib, Some(KEYMAP), &["sounds", "maps", "icons"]);
    let mut unpacker = Unpacker::new(&movie).unwrap();

    let mut out = Vec::new();
    let missing = unpacker.unpack(&mut out).unwrap();

    assert_eq!(missing, None);
    assert_eq!(out, b"SOUNDS|MAPS|ICONS|");
    assert_eq!(unpacker.order().as_slice(), ["sounds", "maps", "icons"]);
    assert_eq!(unpacker.keymap().as_str(), KEYMAP);
    assert_eq!(unpacker.char_map().len(), KEYMAP.len());
}

#[test]
fn test_missing_binary_reported() {
    let movie = packed_movie(Compression::None, Some(KEYMAP), &["icons", "music", "maps"]);
    let mut unpacker = Unpacker::new(&movie).unwrap();

    let mut out = Vec::new();
    let missing = unpacker.unpack(&mut out).unwrap();

    assert_eq!(missing, Some("music"));
    assert_eq!(out, b"ICONS|");
}

#[test]
fn test_steps_separately() {
    let movie = packed_movie(Compression::None, Some(KEYMAP), &["maps"]);
    let mut unpacker = Unpacker::new(&movie).unwrap();

    assert_eq!(unpacker.resolve_order().unwrap().len(), 1);
    // resolving again does not append
    assert_eq!(unpacker.resolve_order().unwrap().len(), 1);

    unpacker.resolve_binaries();
    assert_eq!(unpacker.binaries().len(), 3);
    assert!(unpacker.binaries().contains_key("sounds"));

    let mut out = Vec::new();
    assert_eq!(unpacker.write_binaries(&mut out).unwrap(), None);
    assert_eq!(out, b"MAPS|");
}

#[test]
fn test_already_unpacked() {
    let movie = packed_movie(Compression::None, None, &[]);
    let mut unpacker = Unpacker::new(&movie).unwrap();

    let mut out = Vec::new();
    assert_eq!(unpacker.unpack(&mut out).unwrap(), None);
    assert!(unpacker.order().is_empty());
    assert!(unpacker.keymap().is_empty());
    assert!(out.is_empty());
}

#[test]
fn test_strict_requires_keymap() {
    let movie = packed_movie(Compression::None, None, &["icons"]);
    let mut unpacker = Unpacker::new(&movie).unwrap().with_options(ResolveOptions {
        strict: true,
        ..ResolveOptions::default()
    });
    assert!(matches!(
        unpacker.resolve_order(),
        Err(UnpackError::MissingKeymap)
    ));
}

#[test]
fn test_class_index_out_of_range() {
    let movie = packed_movie(Compression::None, Some(KEYMAP), &["icons"]);
    let mut unpacker = Unpacker::new(&movie).unwrap().with_options(ResolveOptions {
        class_index: 3,
        ..ResolveOptions::default()
    });
    assert!(matches!(
        unpacker.resolve_order(),
        Err(UnpackError::Abc(BytecodeError::IndexOutOfRange { table: "class", .. }))
    ));
}

#[test]
fn test_short_keymap() {
    // accessors index past the end of a shorter alphabet
    let movie = packed_movie(Compression::None, Some("abc"), &["icons"]);
    let mut unpacker = Unpacker::new(&movie).unwrap();
    assert!(matches!(
        unpacker.resolve_order(),
        Err(UnpackError::KeymapIndex { index: 3, len: 3 })
    ));
}

#[test]
fn test_missing_frame1() {
    let abc = PackedClass::new().build(Some(KEYMAP), &["icons"]);
    let bytes = MovieBuilder::new()
        .do_abc("frame2", &abc)
        .to_bytes()
        .unwrap();
    let movie = Movie::from_buffer(&bytes).unwrap();
    assert!(matches!(
        Unpacker::new(&movie),
        Err(UnpackError::MissingFrame1)
    ));
}

#[test]
fn test_write_to_file() {
    use std::io::{Read, Seek};

    let movie = packed_movie(Compression::Zlib, Some(KEYMAP), &["icons", "sounds"]);
    let mut unpacker = Unpacker::new(&movie).unwrap();

    let mut file = tempfile::tempfile().unwrap();
    assert_eq!(unpacker.unpack(&mut file).unwrap(), None);

    file.rewind().unwrap();
    let mut written = String::new();
    file.read_to_string(&mut written).unwrap();
    assert_eq!(written, "ICONS|SOUNDS|");
}
