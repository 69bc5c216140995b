//! Little-endian byte and bit cursors over SWF data

use crate::error::{MovieError, Result};

/// Byte cursor
pub(crate) struct SwfReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SwfReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(MovieError::UnexpectedEnd);
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// NUL-terminated string, decoded lossily
    pub(crate) fn read_cstring(&mut self) -> Result<String> {
        let rest = self.rest();
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(MovieError::UnexpectedEnd)?;
        let s = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(s)
    }
}

/// MSB-first bit cursor, used for `RECT` records
pub(crate) struct BitReader<'a> {
    bytes: &'a [u8],
    bit: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit: 0 }
    }

    /// Bytes touched so far, counting a partial byte
    pub(crate) fn byte_len(&self) -> usize {
        self.bit.div_ceil(8)
    }

    pub(crate) fn read_ub(&mut self, bits: u32) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..bits {
            let byte = *self
                .bytes
                .get(self.bit / 8)
                .ok_or(MovieError::UnexpectedEnd)?;
            let set = (byte >> (7 - self.bit % 8)) & 1;
            value = (value << 1) | u32::from(set);
            self.bit += 1;
        }
        Ok(value)
    }

    pub(crate) fn read_sb(&mut self, bits: u32) -> Result<i32> {
        let value = self.read_ub(bits)?;
        if bits == 0 || bits >= 32 {
            return Ok(value as i32);
        }
        let shift = 32 - bits;
        Ok(((value << shift) as i32) >> shift)
    }
}

/// MSB-first bit sink
#[derive(Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    bit: usize,
}

impl BitWriter {
    pub(crate) fn write_ub(&mut self, bits: u32, value: u32) {
        for i in (0..bits).rev() {
            if self.bit % 8 == 0 {
                self.bytes.push(0);
            }
            let set = ((value >> i) & 1) as u8;
            if let Some(last) = self.bytes.last_mut() {
                *last |= set << (7 - self.bit % 8);
            }
            self.bit += 1;
        }
    }

    pub(crate) fn write_sb(&mut self, bits: u32, value: i32) {
        self.write_ub(bits, value as u32);
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cstring() {
        let mut r = SwfReader::new(b"frame1\0rest");
        assert_eq!(r.read_cstring().unwrap(), "frame1");
        assert_eq!(r.rest(), b"rest");
    }

    #[test]
    fn test_cstring_unterminated() {
        let mut r = SwfReader::new(b"frame1");
        assert!(matches!(r.read_cstring(), Err(MovieError::UnexpectedEnd)));
    }

    #[test]
    fn test_bits() {
        let mut w = BitWriter::default();
        w.write_ub(5, 15);
        w.write_sb(15, -20);
        w.write_sb(15, 11000);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 5);

        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_ub(5).unwrap(), 15);
        assert_eq!(r.read_sb(15).unwrap(), -20);
        assert_eq!(r.read_sb(15).unwrap(), 11000);
        assert_eq!(r.byte_len(), 5);
    }
}
