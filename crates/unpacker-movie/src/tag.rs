//! Tag records

use unpacker_abc::AbcFile;

use crate::error::Result;
use crate::stream::SwfReader;

/// Tag codes the reader understands
pub mod code {
    /// End of the tag list
    pub const END: u16 = 0;
    /// `ShowFrame`
    pub const SHOW_FRAME: u16 = 1;
    /// `DoABC` without flags and name
    pub const DO_ABC1: u16 = 72;
    /// `SymbolClass`
    pub const SYMBOL_CLASS: u16 = 76;
    /// `DoABC`
    pub const DO_ABC: u16 = 82;
    /// `DefineBinaryData`
    pub const DEFINE_BINARY_DATA: u16 = 87;
}

/// Length value that announces a 32-bit length after the short header
const LONG_LENGTH: u16 = 0x3F;

/// An ABC block
#[derive(Debug, Clone, PartialEq)]
pub struct DoAbc {
    /// Lazy-initialize flags
    pub flags: u32,
    /// Block name
    pub name: String,
    /// Size of the raw ABC payload
    pub size: usize,
    /// Parsed payload
    pub abc: AbcFile,
}

/// An embedded binary resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryData {
    /// Character id, linked to a class name by `SymbolClass`
    pub char_id: u16,
    /// Payload
    pub data: Vec<u8>,
}

/// A decoded tag
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    /// `DoABC` or `DoABC1`
    DoAbc(DoAbc),
    /// Character id to class name links
    SymbolClass(Vec<(u16, String)>),
    /// `DefineBinaryData`
    BinaryData(BinaryData),
    /// `End`
    End,
    /// Anything else, kept only by code and length
    Other {
        /// Tag code
        code: u16,
        /// Body length
        len: usize,
    },
}

/// Read one tag header and body
pub(crate) fn read_tag(reader: &mut SwfReader<'_>) -> Result<Tag> {
    let header = reader.read_u16()?;
    let tag_code = header >> 6;
    let len = match header & LONG_LENGTH {
        LONG_LENGTH => reader.read_u32()? as usize,
        short => short as usize,
    };
    let body = reader.read_bytes(len)?;
    let mut body = SwfReader::new(body);

    let tag = match tag_code {
        code::END => Tag::End,
        code::DO_ABC => {
            let flags = body.read_u32()?;
            let name = body.read_cstring()?;
            let payload = body.rest();
            Tag::DoAbc(DoAbc {
                flags,
                name,
                size: payload.len(),
                abc: AbcFile::from_bytes(payload)?,
            })
        }
        code::DO_ABC1 => {
            let payload = body.rest();
            Tag::DoAbc(DoAbc {
                flags: 0,
                name: String::new(),
                size: payload.len(),
                abc: AbcFile::from_bytes(payload)?,
            })
        }
        code::SYMBOL_CLASS => {
            let count = body.read_u16()?;
            let mut symbols = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                let id = body.read_u16()?;
                let name = body.read_cstring()?;
                symbols.push((id, name));
            }
            Tag::SymbolClass(symbols)
        }
        code::DEFINE_BINARY_DATA => {
            let char_id = body.read_u16()?;
            let _reserved = body.read_u32()?;
            Tag::BinaryData(BinaryData {
                char_id,
                data: body.rest().to_vec(),
            })
        }
        other => Tag::Other { code: other, len },
    };

    Ok(tag)
}

/// Append a tag header and body
pub(crate) fn write_tag(out: &mut Vec<u8>, tag_code: u16, body: &[u8]) {
    if body.len() < usize::from(LONG_LENGTH) {
        out.extend_from_slice(&((tag_code << 6) | body.len() as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&((tag_code << 6) | LONG_LENGTH).to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(body);
}
