use std::fmt;

use crate::byte::Byte;
use crate::error::{Error, Result, ValidationError};
use crate::memory::Address;
use crate::processor::{Processor, Snapshot};

/// The closed instruction set.
///
/// An instruction is immutable once built. Decoded instructions get their
/// operands from the byte stream; compound instructions (`IfNotZero`,
/// `WhileNotZero`) carry a nested body that is only ever built in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    /// A := value
    LoadValue(Byte),
    /// A <-> B
    Swap,
    /// Saturating split: A := min(A+B, 127), B := max(0, A+B-127)
    Add,
    /// A := A-B, B := 0. Fails if B > A.
    Subtract,
    /// mem[addr] := A
    Store(Address),
    /// A := mem[addr]
    Load(Address),
    IfNotZero(Vec<Instruction>),
    WhileNotZero(Vec<Instruction>),
}

impl Instruction {
    pub fn load_value(value: i64) -> std::result::Result<Instruction, ValidationError> {
        Ok(Instruction::LoadValue(Byte::new(value)?))
    }

    pub fn store(addr: usize) -> std::result::Result<Instruction, ValidationError> {
        Ok(Instruction::Store(Address::new(addr)?))
    }

    pub fn load(addr: usize) -> std::result::Result<Instruction, ValidationError> {
        Ok(Instruction::Load(Address::new(addr)?))
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Instruction::IfNotZero(_) | Instruction::WhileNotZero(_))
    }

    /// Execute against `cpu` and return a record that can undo it.
    pub fn execute(&self, cpu: &mut Processor) -> Result<Executed> {
        let before = self.perform(cpu)?;
        Ok(Executed {
            instruction: self.clone(),
            before,
        })
    }

    /// Snapshot, advance the program counter, apply the effect.
    ///
    /// On failure the processor is rolled back to the snapshot, so a
    /// rejected result never leaves a half-applied instruction behind.
    pub(crate) fn perform(&self, cpu: &mut Processor) -> Result<Snapshot> {
        let before = cpu.snapshot();
        let outcome = cpu
            .advance_program()
            .map_err(Error::from)
            .and_then(|()| self.apply(cpu));
        match outcome {
            Ok(()) => Ok(before),
            Err(err) => {
                cpu.restore(&before);
                Err(err)
            }
        }
    }

    fn apply(&self, cpu: &mut Processor) -> Result<()> {
        match self {
            Instruction::Nop => {}
            Instruction::LoadValue(value) => cpu.set_a(*value),
            Instruction::Swap => {
                let (a, b) = (cpu.a(), cpu.b());
                cpu.set_a(b);
                cpu.set_b(a);
            }
            Instruction::Add => {
                let sum = cpu.a().get() as i64 + cpu.b().get() as i64;
                let max = Byte::MAX_VALUE as i64;
                let a = Byte::new(sum.min(max))?;
                let b = Byte::new((sum - max).max(0))?;
                cpu.set_a(a);
                cpu.set_b(b);
            }
            Instruction::Subtract => {
                let (a, b) = (cpu.a().get(), cpu.b().get());
                let diff = a as i64 - b as i64;
                if diff < 0 {
                    return Err(ValidationError::Underflow { a, b }.into());
                }
                cpu.set_a(Byte::new(diff)?);
                cpu.set_b(Byte::ZERO);
            }
            Instruction::Store(addr) => {
                let a = cpu.a();
                cpu.set_data(*addr, a);
            }
            Instruction::Load(addr) => {
                let value = cpu.data(*addr);
                cpu.set_a(value);
            }
            Instruction::IfNotZero(body) => {
                if !cpu.a().is_zero() {
                    cpu.run_instructions(body)?;
                }
            }
            Instruction::WhileNotZero(body) => {
                while !cpu.a().is_zero() {
                    cpu.run_instructions(body)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Nop => write!(f, "NOP"),
            Instruction::LoadValue(v) => write!(f, "LODV {v}"),
            Instruction::Swap => write!(f, "SWAP"),
            Instruction::Add => write!(f, "ADD"),
            Instruction::Subtract => write!(f, "SUB"),
            Instruction::Store(addr) => write!(f, "STR {addr}"),
            Instruction::Load(addr) => write!(f, "LOD {addr}"),
            Instruction::IfNotZero(body) => write_compound(f, "IFNZ", body),
            Instruction::WhileNotZero(body) => write_compound(f, "WHNZ", body),
        }
    }
}

fn write_compound(f: &mut fmt::Formatter<'_>, name: &str, body: &[Instruction]) -> fmt::Result {
    write!(f, "{name} [")?;
    for (i, instruction) in body.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{instruction}")?;
    }
    write!(f, "]")
}

/// An instruction that has run, together with the processor state from
/// just before it ran.
///
/// Undoing a compound instruction only rewinds to the state before the
/// compound began; nested instructions are not tracked individually.
#[derive(Debug, Clone)]
pub struct Executed {
    instruction: Instruction,
    before: Snapshot,
}

impl Executed {
    pub(crate) fn new(instruction: Instruction, before: Snapshot) -> Self {
        Self {
            instruction,
            before,
        }
    }

    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    pub fn before(&self) -> &Snapshot {
        &self.before
    }

    /// Restore registers, program counter and all of data memory.
    pub fn undo(&self, cpu: &mut Processor) {
        cpu.restore(&self.before);
    }
}
