use std::fmt::Write;

use crate::byte::Byte;
use crate::error::SystemError;
use crate::instruction::Instruction;

/// Opcodes with a wire encoding.
///
/// Compound instructions and the memory instructions have no encoding and
/// can only be built in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Nop = 1,
    Add = 2,
    Swap = 5,
    LoadValue = 9,
}

const OPCODE_TABLE: [Opcode; 4] = [Opcode::Nop, Opcode::Add, Opcode::Swap, Opcode::LoadValue];

impl Opcode {
    pub fn from_byte(code: u8) -> Option<Opcode> {
        OPCODE_TABLE.iter().copied().find(|op| *op as u8 == code)
    }

    /// Returns true if `code` decodes to an instruction.
    pub fn is_instruction(code: u8) -> bool {
        Self::from_byte(code).is_some()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::Add => "ADD",
            Opcode::Swap => "SWAP",
            Opcode::LoadValue => "LODV",
        }
    }

    /// Number of operand bytes that follow the opcode in the stream.
    pub fn operand_bytes(self) -> usize {
        match self {
            Opcode::LoadValue => 1,
            Opcode::Nop | Opcode::Add | Opcode::Swap => 0,
        }
    }

    /// Build the instruction for this opcode, reading its operands from
    /// `decoder`.
    fn construct(self, decoder: &mut Decoder) -> Result<Instruction, SystemError> {
        let truncated = SystemError::TruncatedProgram {
            opcode: self.code(),
            expected: self.operand_bytes(),
        };
        Ok(match self {
            Opcode::Nop => Instruction::Nop,
            Opcode::Add => Instruction::Add,
            Opcode::Swap => Instruction::Swap,
            Opcode::LoadValue => Instruction::LoadValue(decoder.next_value().ok_or(truncated)?),
        })
    }
}

/// Forward-only reader over a byte program.
#[derive(Debug, Clone)]
pub struct Decoder {
    program: Vec<Byte>,
    cursor: usize,
}

impl Decoder {
    pub fn new(program: &[u8]) -> Self {
        Self {
            program: program.iter().copied().map(Byte::from).collect(),
            cursor: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.program.len()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    /// Read the byte at the cursor and advance past it.
    pub fn next_value(&mut self) -> Option<Byte> {
        let value = self.program.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(value)
    }

    /// Decode one instruction: an opcode followed by its operand bytes.
    pub fn next_instruction(&mut self) -> Result<Instruction, SystemError> {
        let code = self.next_value().ok_or(SystemError::NoMoreInstructions)?;
        let opcode = Opcode::from_byte(code.get())
            .ok_or(SystemError::UnrecognizedInstruction(code.get()))?;
        opcode.construct(self)
    }
}

impl Iterator for Decoder {
    type Item = Result<Instruction, SystemError>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.has_next() {
            return None;
        }
        Some(self.next_instruction())
    }
}

/// Pretty-print a disassembly of `program`, one instruction per line.
///
/// Unknown opcodes are shown as `???` and disassembly continues with the
/// following byte.
pub fn disassemble(program: &[u8]) -> String {
    let mut out = String::new();
    let mut addr = 0usize;
    while addr < program.len() {
        let code = program[addr];
        let Some(opcode) = Opcode::from_byte(code) else {
            let _ = writeln!(out, "{addr:04X}: {code:02X}         ???");
            addr += 1;
            continue;
        };

        let size = 1 + opcode.operand_bytes();
        let end = (addr + size).min(program.len());
        let bytes = &program[addr..end];

        let mut hex = String::new();
        for (i, b) in bytes.iter().enumerate() {
            if i > 0 {
                hex.push(' ');
            }
            let _ = write!(hex, "{b:02X}");
        }

        let operands: Vec<String> = bytes[1..].iter().map(|b| b.to_string()).collect();
        let mut line = opcode.mnemonic().to_string();
        if !operands.is_empty() {
            line.push(' ');
            line.push_str(&operands.join(", "));
        }
        if bytes.len() < size {
            line.push_str(" (truncated)");
        }

        let _ = writeln!(out, "{addr:04X}: {hex:<10} {line}");
        addr = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_next_and_next_value() {
        let mut decoder = Decoder::new(&[1, 2]);
        assert!(decoder.has_next());
        assert_eq!(decoder.next_value().map(Byte::get), Some(1));
        assert_eq!(decoder.next_value().map(Byte::get), Some(2));
        assert!(!decoder.has_next());
        assert_eq!(decoder.next_value(), None);
        assert_eq!(decoder.position(), 2);
    }

    #[test]
    fn test_decode_every_opcode() {
        let decoder = Decoder::new(&[1, 2, 5, 9, 33]);
        let program: Vec<Instruction> = decoder.collect::<Result<_, _>>().unwrap();
        assert_eq!(
            program,
            vec![
                Instruction::Nop,
                Instruction::Add,
                Instruction::Swap,
                Instruction::LoadValue(Byte::from(33)),
            ]
        );
    }

    #[test]
    fn test_load_value_consumes_operand() {
        // The operand 1 must not be decoded as a NOP.
        let mut decoder = Decoder::new(&[9, 1]);
        assert_eq!(
            decoder.next_instruction(),
            Ok(Instruction::LoadValue(Byte::from(1)))
        );
        assert!(!decoder.has_next());
    }

    #[test]
    fn test_unrecognized_opcode() {
        let mut decoder = Decoder::new(&[150]);
        assert_eq!(
            decoder.next_instruction(),
            Err(SystemError::UnrecognizedInstruction(150))
        );
    }

    #[test]
    fn test_truncated_operand() {
        let mut decoder = Decoder::new(&[1, 9]);
        assert_eq!(decoder.next_instruction(), Ok(Instruction::Nop));
        assert_eq!(
            decoder.next_instruction(),
            Err(SystemError::TruncatedProgram {
                opcode: 9,
                expected: 1
            })
        );
    }

    #[test]
    fn test_exhausted() {
        let mut decoder = Decoder::new(&[]);
        assert!(decoder.is_empty());
        assert_eq!(
            decoder.next_instruction(),
            Err(SystemError::NoMoreInstructions)
        );
        assert!(decoder.next().is_none());
    }

    #[test]
    fn test_opcode_table() {
        for code in 0..=255u8 {
            let expected = matches!(code, 1 | 2 | 5 | 9);
            assert_eq!(Opcode::is_instruction(code), expected, "opcode {code}");
        }
        assert_eq!(Opcode::from_byte(9).map(Opcode::operand_bytes), Some(1));
        assert_eq!(Opcode::from_byte(5).map(Opcode::code), Some(5));
    }

    #[test]
    fn test_disassemble() {
        let text = disassemble(&[9, 10, 5, 2, 150, 1]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("0000: 09 0A"));
        assert!(lines[0].ends_with("LODV 10"));
        assert!(lines[1].ends_with("SWAP"));
        assert!(lines[2].ends_with("ADD"));
        assert!(lines[3].starts_with("0004: 96"));
        assert!(lines[3].ends_with("???"));
        assert!(lines[4].ends_with("NOP"));
    }

    #[test]
    fn test_disassemble_truncated() {
        let text = disassemble(&[9]);
        assert!(text.trim_end().ends_with("LODV (truncated)"));
    }
}
