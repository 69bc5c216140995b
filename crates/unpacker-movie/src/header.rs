//! Movie header

use std::fmt;
use std::io::{Read, Write};

use flate2::Compression as Level;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{MovieError, Result};
use crate::stream::{BitReader, BitWriter, SwfReader};

/// Body compression, selected by the signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// `FWS`
    None,
    /// `CWS`, zlib
    Zlib,
    /// `ZWS`, LZMA
    Lzma,
}

impl Compression {
    /// Classify a signature
    pub fn from_signature(signature: [u8; 3]) -> Result<Self> {
        match &signature {
            b"FWS" => Ok(Self::None),
            b"CWS" => Ok(Self::Zlib),
            b"ZWS" => Ok(Self::Lzma),
            _ => Err(MovieError::InvalidSignature(signature)),
        }
    }

    /// Signature bytes
    pub fn signature(self) -> &'static [u8; 3] {
        match self {
            Self::None => b"FWS",
            Self::Zlib => b"CWS",
            Self::Lzma => b"ZWS",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Lzma => "lzma",
        })
    }
}

/// Rectangle in twips
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    /// Left
    pub x_min: i32,
    /// Right
    pub x_max: i32,
    /// Top
    pub y_min: i32,
    /// Bottom
    pub y_max: i32,
}

impl Rect {
    /// Rectangle from a pixel size
    pub fn from_pixels(width: i32, height: i32) -> Self {
        Self {
            x_min: 0,
            x_max: width * 20,
            y_min: 0,
            y_max: height * 20,
        }
    }

    fn read(reader: &mut SwfReader<'_>) -> Result<Self> {
        let mut bits = BitReader::new(reader.rest());
        let nbits = bits.read_ub(5)?;
        let rect = Self {
            x_min: bits.read_sb(nbits)?,
            x_max: bits.read_sb(nbits)?,
            y_min: bits.read_sb(nbits)?,
            y_max: bits.read_sb(nbits)?,
        };
        reader.read_bytes(bits.byte_len())?;
        Ok(rect)
    }

    fn write(&self, out: &mut Vec<u8>) {
        let nbits = [self.x_min, self.x_max, self.y_min, self.y_max]
            .into_iter()
            .map(signed_bits)
            .max()
            .unwrap_or(1);
        let mut bits = BitWriter::default();
        bits.write_ub(5, nbits);
        for value in [self.x_min, self.x_max, self.y_min, self.y_max] {
            bits.write_sb(nbits, value);
        }
        out.extend_from_slice(&bits.into_bytes());
    }
}

/// Bits needed to hold `value` as a signed field
fn signed_bits(value: i32) -> u32 {
    let magnitude = if value < 0 { !value } else { value };
    (32 - magnitude.leading_zeros() + 1).min(31)
}

/// Header fields that precede the tag list
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Body compression
    pub compression: Compression,
    /// Player version
    pub version: u8,
    /// Declared length of the uncompressed file
    pub file_length: u32,
    /// Stage size
    pub frame_size: Rect,
    /// Frame rate, 8.8 fixed point
    pub frame_rate: u16,
    /// Number of frames
    pub frame_count: u16,
}

impl Header {
    /// Frame rate in frames per second
    pub fn frames_per_second(&self) -> f32 {
        f32::from(self.frame_rate) / 256.0
    }
}

/// Upper bound on the preallocated body, as a multiple of the compressed size
const MAX_INFLATE_HINT: usize = 8;

/// Split the raw file into its header and the uncompressed tag data
pub(crate) fn read_header(bytes: &[u8]) -> Result<(Header, Vec<u8>)> {
    let mut reader = SwfReader::new(bytes);
    let signature = reader.read_bytes(3)?;
    let compression = Compression::from_signature([signature[0], signature[1], signature[2]])?;
    let version = reader.read_u8()?;
    let file_length = reader.read_u32()?;

    let body = match compression {
        Compression::None => reader.rest().to_vec(),
        Compression::Zlib => {
            let compressed = reader.rest();
            let hint = (file_length.saturating_sub(8) as usize)
                .min(compressed.len().saturating_mul(MAX_INFLATE_HINT));
            let mut decoder = ZlibDecoder::new(compressed);
            let mut body = Vec::with_capacity(hint);
            decoder
                .read_to_end(&mut body)
                .map_err(|e| MovieError::Decompression(e.to_string()))?;
            body
        }
        Compression::Lzma => return Err(MovieError::UnsupportedCompression("lzma")),
    };

    let declared = file_length.saturating_sub(8) as usize;
    if body.len() != declared {
        tracing::debug!(declared, actual = body.len(), "movie length mismatch");
    }

    let mut reader = SwfReader::new(&body);
    let frame_size = Rect::read(&mut reader)?;
    let frame_rate = reader.read_u16()?;
    let frame_count = reader.read_u16()?;
    let tags = reader.rest().to_vec();

    Ok((
        Header {
            compression,
            version,
            file_length,
            frame_size,
            frame_rate,
            frame_count,
        },
        tags,
    ))
}

/// Assemble a complete file from a header and encoded tag data.
///
/// `file_length` is recomputed from the body.
pub(crate) fn write_movie(header: &Header, tags: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    header.frame_size.write(&mut body);
    body.extend_from_slice(&header.frame_rate.to_le_bytes());
    body.extend_from_slice(&header.frame_count.to_le_bytes());
    body.extend_from_slice(tags);

    let mut out = Vec::with_capacity(body.len() + 8);
    out.extend_from_slice(header.compression.signature());
    out.push(header.version);
    out.extend_from_slice(&(body.len() as u32 + 8).to_le_bytes());

    match header.compression {
        Compression::None => out.extend_from_slice(&body),
        Compression::Zlib => {
            let mut encoder = ZlibEncoder::new(out, Level::default());
            encoder.write_all(&body)?;
            out = encoder.finish()?;
        }
        Compression::Lzma => return Err(MovieError::UnsupportedCompression("lzma")),
    }
    Ok(out)
}
