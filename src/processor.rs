use std::fmt;

use crate::byte::Byte;
use crate::decoder::Decoder;
use crate::error::{Result, SystemError, ValidationError};
use crate::instruction::{Executed, Instruction};
use crate::memory::{Address, DataMemory};

/// Lifecycle of the loaded program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unloaded,
    Loaded,
    Running,
    Stopped,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Unloaded => write!(f, "unloaded"),
            Status::Loaded => write!(f, "loaded"),
            Status::Running => write!(f, "running"),
            Status::Stopped => write!(f, "stopped"),
        }
    }
}

/// A full copy of the machine state: both accumulators, the program
/// counter and every data memory cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    a: Byte,
    b: Byte,
    program_counter: Byte,
    memory: DataMemory,
}

impl Snapshot {
    pub fn a(&self) -> Byte {
        self.a
    }

    pub fn b(&self) -> Byte {
        self.b
    }

    pub fn program_counter(&self) -> Byte {
        self.program_counter
    }

    pub fn data(&self, addr: Address) -> Byte {
        self.memory.get(addr)
    }
}

/// The 8-bit processor: two accumulators, an executed-instruction counter,
/// 1024 cells of data memory and an optional loaded program.
pub struct Processor {
    a: Byte,
    b: Byte,
    program_counter: Byte,
    memory: DataMemory,
    status: Status,
    decoder: Option<Decoder>,
}

impl Processor {
    pub fn new() -> Self {
        Self {
            a: Byte::ZERO,
            b: Byte::ZERO,
            program_counter: Byte::ZERO,
            memory: DataMemory::new(),
            status: Status::Unloaded,
            decoder: None,
        }
    }

    pub fn a(&self) -> Byte {
        self.a
    }

    pub fn set_a(&mut self, value: Byte) {
        self.a = value;
    }

    pub fn b(&self) -> Byte {
        self.b
    }

    pub fn set_b(&mut self, value: Byte) {
        self.b = value;
    }

    pub fn program_counter(&self) -> Byte {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, value: Byte) {
        self.program_counter = value;
    }

    /// Count one more executed instruction. Fails past 255.
    pub fn advance_program(&mut self) -> std::result::Result<(), ValidationError> {
        self.program_counter = Byte::new(self.program_counter.get() as i64 + 1)?;
        Ok(())
    }

    pub fn data(&self, addr: Address) -> Byte {
        self.memory.get(addr)
    }

    pub fn set_data(&mut self, addr: Address, value: Byte) {
        self.memory.set(addr, value);
    }

    pub fn memory(&self) -> &DataMemory {
        &self.memory
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_started(&self) -> bool {
        self.status == Status::Running
    }

    /// Returns true if the loaded program has instructions left to decode.
    pub fn has_next(&self) -> bool {
        self.decoder.as_ref().is_some_and(Decoder::has_next)
    }

    /// Reset all state and bind a fresh decoder over `program`.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if self.is_started() {
            return Err(SystemError::ProgramAlreadyRunning.into());
        }
        self.reset();
        self.decoder = Some(Decoder::new(program));
        self.status = Status::Loaded;
        Ok(())
    }

    pub fn start(&mut self) {
        self.status = Status::Running;
    }

    pub fn stop(&mut self) {
        self.status = if self.decoder.is_some() {
            Status::Stopped
        } else {
            Status::Unloaded
        };
    }

    /// Decode and execute the next instruction of the loaded program.
    pub fn step(&mut self) -> Result<Executed> {
        if !self.is_started() {
            return Err(SystemError::ProgramNotStarted.into());
        }
        let decoder = self.decoder.as_mut().ok_or(SystemError::NoProgramLoaded)?;
        if !decoder.has_next() {
            return Err(SystemError::NoMoreInstructions.into());
        }
        let instruction = decoder.next_instruction()?;
        let before = instruction.perform(self)?;
        Ok(Executed::new(instruction, before))
    }

    /// Start, step until the program is exhausted, stop.
    ///
    /// The processor is stopped again if any step fails.
    pub fn run(&mut self) -> Result<()> {
        if self.decoder.is_none() {
            return Err(SystemError::NoProgramLoaded.into());
        }
        self.start();
        while self.has_next() {
            if let Err(err) = self.step() {
                self.stop();
                return Err(err);
            }
        }
        self.stop();
        Ok(())
    }

    /// Execute a pre-built instruction list in order, with no lifecycle
    /// gating and no decoder involved.
    pub fn run_instructions(&mut self, instructions: &[Instruction]) -> Result<()> {
        for instruction in instructions {
            instruction.perform(self)?;
        }
        Ok(())
    }

    /// Zero accumulators, counter and memory. The loaded program and the
    /// lifecycle status are left alone.
    pub fn reset(&mut self) {
        self.a = Byte::ZERO;
        self.b = Byte::ZERO;
        self.program_counter = Byte::ZERO;
        self.memory.clear();
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            a: self.a,
            b: self.b,
            program_counter: self.program_counter,
            memory: self.memory.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.a = snapshot.a;
        self.b = snapshot.b;
        self.program_counter = snapshot.program_counter;
        self.memory.copy_from(&snapshot.memory);
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A={:02X} ({}) B={:02X} ({}) PC={} [{}]",
            self.a.get(),
            self.a,
            self.b.get(),
            self.b,
            self.program_counter,
            self.status
        )
    }
}
