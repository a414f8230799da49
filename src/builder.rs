use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::byte::Byte;
use crate::decoder::Opcode;
use crate::error::BusinessError;

/// Configuration for generating a random program.
pub struct RandomProgramConfig {
    /// Number of instructions to emit.
    pub instructions: usize,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for RandomProgramConfig {
    fn default() -> Self {
        Self {
            instructions: 16,
            seed: 0,
        }
    }
}

/// Assembles the byte encoding of a program, one instruction at a time.
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    program: Vec<u8>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nop(mut self) -> Self {
        self.program.push(Opcode::Nop.code());
        self
    }

    pub fn add(mut self) -> Self {
        self.program.push(Opcode::Add.code());
        self
    }

    pub fn swap(mut self) -> Self {
        self.program.push(Opcode::Swap.code());
        self
    }

    pub fn load_value(mut self, value: Byte) -> Self {
        self.program.push(Opcode::LoadValue.code());
        self.program.push(value.get());
        self
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    pub fn build(self) -> Result<Vec<u8>, BusinessError> {
        if self.program.is_empty() {
            return Err(BusinessError::EmptyProgram);
        }
        Ok(self.program)
    }

    /// A program of `config.instructions` randomly chosen instructions.
    ///
    /// The result always decodes. `LODV` operands stay at or below
    /// `Byte::MAX_VALUE`, so two loaded values never overflow `ADD`.
    pub fn random(config: &RandomProgramConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut builder = Self::new();
        for _ in 0..config.instructions {
            builder = match rng.gen_range(0..4) {
                0 => builder.nop(),
                1 => builder.add(),
                2 => builder.swap(),
                _ => builder.load_value(Byte::from(rng.gen_range(0..=Byte::MAX_VALUE))),
            };
        }
        builder
    }
}

/// Parse whitespace-separated hex bytes. `#` starts a comment that runs to
/// the end of the line.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, BusinessError> {
    let mut program = Vec::new();
    for line in text.lines() {
        let code = line.split('#').next().unwrap_or("");
        for token in code.split_whitespace() {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            let value = u8::from_str_radix(digits, 16)
                .map_err(|_| BusinessError::InvalidHex(token.to_string()))?;
            program.push(value);
        }
    }
    Ok(program)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::decoder::Decoder;
    use crate::processor::Processor;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn random_programs_always_decode(seed in any::<u64>(), instructions in 1usize..128) {
            let config = RandomProgramConfig { instructions, seed };
            let program = ProgramBuilder::random(&config).build().unwrap();
            let decoded: Result<Vec<_>, _> = Decoder::new(&program).collect();
            prop_assert_eq!(decoded.unwrap().len(), instructions);
        }

        #[test]
        fn random_programs_run_to_completion(seed in any::<u64>(), instructions in 1usize..128) {
            let config = RandomProgramConfig { instructions, seed };
            let program = ProgramBuilder::random(&config).build().unwrap();
            let mut cpu = Processor::new();
            cpu.load_program(&program).unwrap();
            cpu.run().unwrap();
            prop_assert_eq!(cpu.program_counter().get() as usize, instructions);
        }
    }
}
