pub mod byte;
pub mod memory;
pub mod error;
pub mod decoder;
pub mod instruction;
pub mod processor;
pub mod builder;

pub use byte::Byte;
pub use error::{Error, Result};
pub use instruction::{Executed, Instruction};
pub use processor::{Processor, Status};
