use std::io::Write;

use unpacker_abc::{AbcFile, Method};
use unpacker_movie::{Compression, Input, Movie, MovieBuilder, MovieError};

fn sample_abc() -> AbcFile {
    let mut builder = AbcFile::builder();
    builder.add_method(Method::builder().build());
    let instance = builder.new_instance("Main");
    builder.add_class(
        instance,
        unpacker_abc::Class {
            cinit: unpacker_abc::MethodIndex(0),
            traits: Vec::new(),
        },
    );
    builder.build()
}

fn sample_movie(compression: Compression) -> Vec<u8> {
    MovieBuilder::new()
        .compression(compression)
        .do_abc("loader", &sample_abc())
        .do_abc("frame1", &sample_abc())
        .tag(9, &[0xFF, 0xFF, 0xFF])
        .binary_data(1, b"first")
        .binary_data(2, &[7u8; 200])
        .binary_data(3, b"unlinked")
        .symbol(1, "pkg_first")
        .symbol(2, "pkg_second")
        .to_bytes()
        .unwrap()
}

#[test]
fn test_read_plain_movie() {
    let movie = Movie::from_buffer(&sample_movie(Compression::None)).unwrap();

    assert_eq!(movie.header.compression, Compression::None);
    assert_eq!(movie.abc_blocks.len(), 2);
    // do_abc x2, background, binary x3, symbols, show frame, end
    assert_eq!(movie.tag_count, 9);

    let frame1 = movie.frame1().expect("frame1 block");
    assert_eq!(frame1.flags, 1);
    assert_eq!(frame1.abc.class_name(0), Some("Main"));
}

#[test]
fn test_read_compressed_movie() {
    let bytes = sample_movie(Compression::Zlib);
    assert_eq!(&bytes[..3], b"CWS");

    let compressed = Movie::from_buffer(&bytes).unwrap();
    let plain = Movie::from_buffer(&sample_movie(Compression::None)).unwrap();
    assert_eq!(compressed.abc_blocks, plain.abc_blocks);
    assert_eq!(compressed.binary_data, plain.binary_data);
}

#[test]
fn test_binaries_need_a_symbol() {
    let movie = Movie::from_buffer(&sample_movie(Compression::None)).unwrap();
    let binaries: Vec<(&str, usize)> = movie
        .binaries()
        .map(|(name, data)| (name, data.len()))
        .collect();
    assert_eq!(binaries, vec![("pkg_first", 5), ("pkg_second", 200)]);
}

#[test]
fn test_no_frame1() {
    let bytes = MovieBuilder::new()
        .do_abc("other", &sample_abc())
        .to_bytes()
        .unwrap();
    let movie = Movie::from_buffer(&bytes).unwrap();
    assert!(movie.frame1().is_none());
}

#[test]
fn test_lzma_movie_rejected() {
    let mut bytes = sample_movie(Compression::None);
    bytes[0] = b'Z';
    assert!(matches!(
        Movie::from_buffer(&bytes),
        Err(MovieError::UnsupportedCompression(_))
    ));
}

#[test]
fn test_garbage_rejected() {
    assert!(matches!(
        Movie::from_buffer(b"not a movie"),
        Err(MovieError::InvalidSignature(_))
    ));
}

#[test]
fn test_corrupt_abc() {
    let bytes = MovieBuilder::new()
        .tag(unpacker_movie::tag::code::DO_ABC, b"\x01\x00\x00\x00frame1\x00\x10")
        .to_bytes()
        .unwrap();
    assert!(matches!(Movie::from_buffer(&bytes), Err(MovieError::Abc(_))));
}

#[test]
fn test_tags_after_end_ignored() {
    let mut bytes = sample_movie(Compression::None);
    bytes.extend_from_slice(&[0xFF, 0xFF]);
    let movie = Movie::from_buffer(&bytes).unwrap();
    assert_eq!(movie.binary_data.len(), 3);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&sample_movie(Compression::Zlib)).unwrap();

    let movie = Movie::from_file(file.path()).unwrap();
    assert!(movie.frame1().is_some());

    let input: Input = file.path().to_str().unwrap().parse().unwrap();
    assert!(!input.is_url());
    assert_eq!(input.load().unwrap(), movie);
}

#[test]
fn test_from_reader() {
    let bytes = sample_movie(Compression::None);
    let movie = Movie::from_reader(&mut bytes.as_slice()).unwrap();
    assert_eq!(movie, Movie::from_buffer(&bytes).unwrap());
}
