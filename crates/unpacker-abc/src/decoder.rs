//! Method body decoding

use crate::error::{BytecodeError, Result};
use crate::instruction::{Instruction, Layout, Opcode, OperandKind, opcode_info};
use crate::reader::ByteReader;

/// Decode a whole method body into a flat instruction list
pub fn decode_code(code: &[u8]) -> Result<Vec<Instruction>> {
    InstructionDecoder::new(code).collect()
}

/// Streaming decoder over the code bytes of one method body.
///
/// Yields instructions in address order and stops after the first error.
pub struct InstructionDecoder<'a> {
    reader: ByteReader<'a>,
    failed: bool,
}

impl<'a> InstructionDecoder<'a> {
    /// Create a decoder positioned at the first byte
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            reader: ByteReader::new(code),
            failed: false,
        }
    }

    fn decode_next(&mut self) -> Result<Instruction> {
        let offset = self.reader.position();
        let byte = self.reader.read_u8()?;
        let (_, layout) =
            opcode_info(byte).ok_or(BytecodeError::InvalidOpcode { opcode: byte, offset })?;

        let mut operands = Vec::new();
        match layout {
            Layout::Fixed(kinds) => {
                for kind in kinds {
                    operands.push(self.read_operand(*kind)?);
                }
            }
            Layout::LookupSwitch => {
                operands.push(self.reader.read_s24()? as u32);
                let case_count = self.reader.read_u30()?;
                operands.push(case_count);
                for _ in 0..=case_count {
                    operands.push(self.reader.read_s24()? as u32);
                }
            }
        }

        Ok(Instruction::at(offset as u32, Opcode::from_byte(byte), operands))
    }

    fn read_operand(&mut self, kind: OperandKind) -> Result<u32> {
        match kind {
            OperandKind::U8 => self.reader.read_u8().map(u32::from),
            OperandKind::U30 => self.reader.read_u30(),
            OperandKind::S24 => self.reader.read_s24().map(|value| value as u32),
        }
    }
}

impl Iterator for InstructionDecoder<'_> {
    type Item = Result<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.reader.is_at_end() {
            return None;
        }
        let result = self.decode_next();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CodeBuilder;

    #[test]
    fn test_decode_string_chain() {
        let mut code = CodeBuilder::new();
        code.get_local_0()
            .call_property(7, 0)
            .get_local_0()
            .call_property(300, 0)
            .add()
            .return_value();

        let instructions = decode_code(code.as_bytes()).unwrap();
        let opcodes: Vec<Opcode> = instructions.iter().map(|i| i.opcode).collect();
        assert_eq!(
            opcodes,
            vec![
                Opcode::GetLocal0,
                Opcode::CallProperty,
                Opcode::GetLocal0,
                Opcode::CallProperty,
                Opcode::Add,
                Opcode::Other(0x48),
            ]
        );
        assert_eq!(instructions[1].operands, vec![7, 0]);
        assert_eq!(instructions[3].operands, vec![300, 0]);
        // 1 + 3 (u30 7, 0) + 1 + 4 (u30 300 takes two bytes, 0)
        assert_eq!(instructions[4].address, 9);
    }

    #[test]
    fn test_decode_branch_offset() {
        // jump -4
        let instructions = decode_code(&[0x10, 0xFC, 0xFF, 0xFF]).unwrap();
        assert_eq!(instructions[0].operand(0).map(|o| o as i32), Some(-4));
    }

    #[test]
    fn test_decode_lookupswitch() {
        // default 5, two cases (count 1 means 2 offsets)
        let code = [0x1B, 0x05, 0, 0, 0x01, 0x01, 0, 0, 0x02, 0, 0];
        let instructions = decode_code(&code).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].operands, vec![5, 1, 1, 2]);
    }

    #[test]
    fn test_decode_debug() {
        let instructions = decode_code(&[0xEF, 0x01, 0x05, 0x00, 0x00]).unwrap();
        assert_eq!(instructions[0].operands, vec![1, 5, 0, 0]);
    }

    #[test]
    fn test_invalid_opcode() {
        let err = decode_code(&[0xD0, 0xFF]).unwrap_err();
        assert!(matches!(
            err,
            BytecodeError::InvalidOpcode {
                opcode: 0xFF,
                offset: 1
            }
        ));
    }

    #[test]
    fn test_truncated_operand() {
        let mut decoder = InstructionDecoder::new(&[0x46, 0x80]);
        assert!(matches!(decoder.next(), Some(Err(BytecodeError::UnexpectedEnd))));
        assert!(decoder.next().is_none());
    }
}
