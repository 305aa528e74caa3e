use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Conditions surfaced by the VM to whoever is driving it.
///
/// None of these are fatal: after a failed `step` the program counter has
/// already moved past the offending instruction and the rest of the state is
/// untouched, so the driver is free to log and keep going or to halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("stack overflow: call at {pc:#06X} with {depth} frames already in use")]
    StackOverflow { pc: u16, depth: usize },

    #[error("stack underflow: return at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("unknown opcode {opcode:#06X} at {pc:#06X}")]
    UnknownOpcode { opcode: u16, pc: u16 },
}
