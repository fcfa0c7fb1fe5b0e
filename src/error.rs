//! Errors raised while assembling source text or executing a binary program.

use std::fmt::{Display, Formatter};
use std::io;

use crate::address::Address;
use crate::bytecode::Operation;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Error {
  // Assembly time //

  /// The mnemonic is not in the instruction table.
  UnknownInstruction(String),
  /// An operand is missing or does not parse as the integer type the instruction requires.
  MalformedOperand {
    mnemonic : String,
    operand  : Option<String>
  },
  /// Wraps an assembly error with the (1-based) source line it occurred on.
  Assembly {
    line   : usize,
    source : Box<Error>
  },

  // Execution time //

  /// The program length is not a whole number of instruction records.
  MalformedStream(usize),
  /// The opcode byte is not in the instruction table.
  UnknownOpcode(u8),
  /// A memory access outside of `[0, memory_size)`.
  OutOfBounds {
    operation   : Operation,
    address     : Address,
    memory_size : usize
  },
  /// A pop from an empty stack.
  StackUnderflow(Operation),
  /// Wraps an execution error with the byte offset of the failing record.
  Execution {
    offset : usize,
    source : Box<Error>
  },
  /// A VM executes exactly one program.
  AlreadyRun,
  /// The requested number of memory cells cannot be allocated.
  MemoryAllocation(usize),

  // IO boundary //
  Io(String)
}

impl Error {
  /// Peels off the `Assembly` and `Execution` context wrappers.
  pub fn root(&self) -> &Error {
    match self {
      | Error::Assembly  { source, .. }
      | Error::Execution { source, .. } => source.root(),
      other                             => other
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Error::UnknownInstruction(mnemonic) => {
        write!(f, "Unknown instruction: {}", mnemonic)
      }

      Error::MalformedOperand { mnemonic, operand: Some(operand) } => {
        write!(f, "{} expects an integer operand but was given `{}`", mnemonic, operand)
      }

      Error::MalformedOperand { mnemonic, operand: None } => {
        write!(f, "{} is missing its operand", mnemonic)
      }

      Error::Assembly { line, source } => {
        write!(f, "Error on line {}: {}", line, source)
      }

      Error::MalformedStream(length) => {
        write!(
          f,
          "Malformed program: {} bytes is not a multiple of the instruction size",
          length
        )
      }

      Error::UnknownOpcode(opcode) => {
        write!(f, "Unknown opcode: 0x{:02X}", opcode)
      }

      Error::OutOfBounds { operation, address, memory_size } => {
        write!(
          f,
          "{}: address {} is outside of memory (size {})",
          operation, address, memory_size
        )
      }

      Error::StackUnderflow(operation) => {
        write!(f, "{}: stack underflow", operation)
      }

      Error::Execution { offset, source } => {
        write!(f, "Error at byte {}: {}", offset, source)
      }

      Error::AlreadyRun => {
        write!(f, "This machine has already executed a program")
      }

      Error::MemoryAllocation(memory_size) => {
        write!(f, "Cannot allocate a memory of {} cells", memory_size)
      }

      Error::Io(message) => {
        write!(f, "IO error: {}", message)
      }

    }
  }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
  fn from(err: io::Error) -> Self {
    Error::Io(err.to_string())
  }
}
