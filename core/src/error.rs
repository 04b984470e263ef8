use thiserror::Error;

/// Everything that can stop the machine or reject its input
#[derive(Debug, Error)]
pub enum Error {
    #[error("unimplemented opcode {opcode:#06X}")]
    UnimplementedOpcode { opcode: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("call stack overflow: more than {depth} nested calls")]
    StackOverflow { depth: usize },

    #[error("return from subroutine with an empty call stack")]
    StackUnderflow,

    #[error("key {key:#04X} is not on the keypad")]
    InvalidKey { key: u8 },

    #[error("an opcode has 4 nibbles, {count} were requested")]
    InvalidNibbleCount { count: usize },

    #[error("program is {size} bytes but at most {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("unable to read program")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
