//! Decoded movie

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::header::{Header, read_header};
use crate::stream::SwfReader;
use crate::tag::{BinaryData, DoAbc, Tag, read_tag};

/// Name of the ABC block holding the packed class
pub const FRAME1: &str = "frame1";

/// The parts of a movie the unpacker works with
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    /// Header
    pub header: Header,
    /// ABC blocks in file order
    pub abc_blocks: Vec<DoAbc>,
    /// Character id to class name
    pub symbols: BTreeMap<u16, String>,
    /// Binary resources in file order
    pub binary_data: Vec<BinaryData>,
    /// Number of tags read, including skipped ones
    pub tag_count: usize,
}

impl Movie {
    /// Decode a complete file
    pub fn from_buffer(bytes: &[u8]) -> Result<Self> {
        let (header, tags) = read_header(bytes)?;
        let mut reader = SwfReader::new(&tags);

        let mut movie = Self {
            header,
            abc_blocks: Vec::new(),
            symbols: BTreeMap::new(),
            binary_data: Vec::new(),
            tag_count: 0,
        };

        while reader.remaining() > 0 {
            let tag = read_tag(&mut reader)?;
            movie.tag_count += 1;
            match tag {
                Tag::End => break,
                Tag::DoAbc(block) => {
                    tracing::debug!(name = %block.name, size = block.size, "abc block");
                    movie.abc_blocks.push(block);
                }
                Tag::SymbolClass(links) => movie.symbols.extend(links),
                Tag::BinaryData(data) => movie.binary_data.push(data),
                Tag::Other { code, len } => {
                    tracing::trace!(code, len, "skipped tag");
                }
            }
        }

        tracing::debug!(
            tags = movie.tag_count,
            abc_blocks = movie.abc_blocks.len(),
            binaries = movie.binary_data.len(),
            symbols = movie.symbols.len(),
            "read movie"
        );
        Ok(movie)
    }

    /// Read and decode a file on disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_buffer(&bytes)
    }

    /// Read a reader to its end and decode
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_buffer(&bytes)
    }

    /// The ABC block named `frame1`
    pub fn frame1(&self) -> Option<&DoAbc> {
        self.abc_blocks.iter().find(|block| block.name == FRAME1)
    }

    /// Binary resources that have a class name, as `(name, payload)`
    pub fn binaries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.binary_data.iter().filter_map(move |binary| {
            let name = self.symbols.get(&binary.char_id)?;
            Some((name.as_str(), binary.data.as_slice()))
        })
    }
}
