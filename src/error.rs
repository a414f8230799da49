use std::error;
use std::fmt;
use std::io;
use std::result;

/// Misuse of the processor lifecycle or a malformed program.
///
/// These are caller-contract violations. They are always surfaced and the
/// caller may recover from them (the debugger reports and keeps going).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    ProgramAlreadyRunning,
    ProgramNotStarted,
    NoProgramLoaded,
    NoMoreInstructions,
    UnrecognizedInstruction(u8),
    /// The program ended before all operand bytes of `opcode` were read.
    TruncatedProgram { opcode: u8, expected: usize },
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SystemError::ProgramAlreadyRunning => write!(f, "program already running"),
            SystemError::ProgramNotStarted => write!(f, "program not started"),
            SystemError::NoProgramLoaded => write!(f, "no program loaded"),
            SystemError::NoMoreInstructions => write!(f, "no more instructions"),
            SystemError::UnrecognizedInstruction(code) => {
                write!(f, "unrecognized instruction with code {code}")
            }
            SystemError::TruncatedProgram { opcode, expected } => write!(
                f,
                "program ends before the {expected} operand byte(s) of opcode {opcode}"
            ),
        }
    }
}

impl error::Error for SystemError {}

/// A value fell outside the domain of a `Byte` or an `Address`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    OutOfRange(i64),
    NotIntegral(f64),
    /// `Subtract` with `b > a`.
    Underflow { a: u8, b: u8 },
    AddressOutOfRange(usize),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ValidationError::OutOfRange(n) => {
                write!(f, "value {n} must be an integer between 0 and 255, inclusive")
            }
            ValidationError::NotIntegral(n) => {
                write!(f, "value {n} must be an integer between 0 and 255, inclusive")
            }
            ValidationError::Underflow { a, b } => {
                write!(f, "subtracting {b} from {a} leaves a negative value")
            }
            ValidationError::AddressOutOfRange(addr) => {
                write!(f, "address {addr} is outside data memory")
            }
        }
    }
}

impl error::Error for ValidationError {}

/// Rejections raised by program builders before a program reaches the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusinessError {
    EmptyProgram,
    InvalidHex(String),
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BusinessError::EmptyProgram => write!(f, "program cannot be empty"),
            BusinessError::InvalidHex(ref token) => write!(f, "invalid hex byte: {token}"),
        }
    }
}

impl error::Error for BusinessError {}

#[derive(Debug)]
pub enum Error {
    System(SystemError),
    Validation(ValidationError),
    Business(BusinessError),
    Io(io::Error),
}

pub type Result<T> = result::Result<T, Error>;

impl Error {
    pub fn is_system(&self) -> bool {
        matches!(self, Error::System(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::System(ref err) => write!(f, "system error: {err}"),
            Error::Validation(ref err) => write!(f, "validation error: {err}"),
            Error::Business(ref err) => write!(f, "{err}"),
            Error::Io(ref err) => write!(f, "IO error: {err}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::System(ref err) => Some(err),
            Error::Validation(ref err) => Some(err),
            Error::Business(ref err) => Some(err),
            Error::Io(ref err) => Some(err),
        }
    }
}

impl From<SystemError> for Error {
    fn from(err: SystemError) -> Error {
        Error::System(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Error {
        Error::Validation(err)
    }
}

impl From<BusinessError> for Error {
    fn from(err: BusinessError) -> Error {
        Error::Business(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
