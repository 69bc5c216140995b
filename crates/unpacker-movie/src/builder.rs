//! Movie assembly

use std::collections::BTreeMap;

use unpacker_abc::AbcFile;

use crate::error::Result;
use crate::header::{Compression, Header, Rect, write_movie};
use crate::tag::{code, write_tag};

/// Builder for creating movie files
#[derive(Debug)]
pub struct MovieBuilder {
    header: Header,
    tags: Vec<u8>,
    symbols: BTreeMap<u16, String>,
}

impl Default for MovieBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieBuilder {
    /// Create a builder for an uncompressed one-frame movie
    pub fn new() -> Self {
        Self {
            header: Header {
                compression: Compression::None,
                version: 32,
                file_length: 0,
                frame_size: Rect::from_pixels(800, 600),
                frame_rate: 30 << 8,
                frame_count: 1,
            },
            tags: Vec::new(),
            symbols: BTreeMap::new(),
        }
    }

    /// Set the body compression
    pub fn compression(mut self, compression: Compression) -> Self {
        self.header.compression = compression;
        self
    }

    /// Set the player version
    pub fn version(mut self, version: u8) -> Self {
        self.header.version = version;
        self
    }

    /// Add a `DoABC` tag
    pub fn do_abc(mut self, name: &str, abc: &AbcFile) -> Self {
        let mut body = 1u32.to_le_bytes().to_vec();
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        body.extend_from_slice(&abc.to_bytes());
        write_tag(&mut self.tags, code::DO_ABC, &body);
        self
    }

    /// Add a `DefineBinaryData` tag
    pub fn binary_data(mut self, char_id: u16, data: &[u8]) -> Self {
        let mut body = char_id.to_le_bytes().to_vec();
        body.extend_from_slice(&[0; 4]);
        body.extend_from_slice(data);
        write_tag(&mut self.tags, code::DEFINE_BINARY_DATA, &body);
        self
    }

    /// Link a character id to a class name
    pub fn symbol(mut self, char_id: u16, name: impl Into<String>) -> Self {
        self.symbols.insert(char_id, name.into());
        self
    }

    /// Add a raw tag
    pub fn tag(mut self, tag_code: u16, body: &[u8]) -> Self {
        write_tag(&mut self.tags, tag_code, body);
        self
    }

    /// Encode the movie; symbols go into one `SymbolClass` tag before `End`
    pub fn to_bytes(mut self) -> Result<Vec<u8>> {
        if !self.symbols.is_empty() {
            let mut body = (self.symbols.len() as u16).to_le_bytes().to_vec();
            for (id, name) in &self.symbols {
                body.extend_from_slice(&id.to_le_bytes());
                body.extend_from_slice(name.as_bytes());
                body.push(0);
            }
            write_tag(&mut self.tags, code::SYMBOL_CLASS, &body);
        }
        write_tag(&mut self.tags, code::SHOW_FRAME, &[]);
        write_tag(&mut self.tags, code::END, &[]);
        write_movie(&self.header, &self.tags)
    }
}
