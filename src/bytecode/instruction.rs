use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, IntoStaticStr, EnumString};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::address::Address;

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is its opcode byte, so the opcode table is exactly this
  enum: `Operation::try_from(byte)` decodes an opcode and `Operation::from_str(mnemonic)`
  looks up a mnemonic. Both lookups are exact; mnemonics are case-sensitive.

  The opcode bytes do not follow any nibble scheme. They are part of the binary format and
  must not be renumbered.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq,        Debug,         Hash
)]
#[repr(u8)]
pub enum Operation {
  #[strum(serialize = "LOAD_CONST")]
  LoadConst = 0x00,  // load_const( constant )
  #[strum(serialize = "SGN")]
  Sgn       = 0x01,  // sgn
  #[strum(serialize = "WRITE_MEM")]
  WriteMem  = 0xA2,  // write_mem( address )
  #[strum(serialize = "READ_MEM")]
  ReadMem   = 0xCE,  // read_mem( address )
}

/// The kind of value carried in the 4 byte operand field.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum OperandKind {
  /// Signed 32 bit constant.
  Constant,
  /// Unsigned 32 bit memory address.
  Address,
  /// Always encoded as zero and ignored when decoded.
  Unused
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  pub fn mnemonic(&self) -> &'static str {
    self.into()
  }

  pub fn operand_kind(&self) -> OperandKind {
    match self {
      Operation::LoadConst => OperandKind::Constant,
      | Operation::ReadMem
      | Operation::WriteMem => OperandKind::Address,
      Operation::Sgn       => OperandKind::Unused
    }
  }

  /// Number of operand tokens the instruction reads from its source line.
  pub fn arity(&self) -> usize {
    match self.operand_kind() {
      OperandKind::Unused => 0,
      _                   => 1
    }
  }
}

/**
  A decoded instruction. The operand is typed according to the opcode: the same four bytes
  are a signed constant for `LOAD_CONST` and an unsigned address for the memory operations.
*/
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Instruction {
  /// [OpCode:8][Constant:i32]
  LoadConst(i32),
  /// [OpCode:8][Address:u32]
  ReadMem(Address),
  /// [OpCode:8][Address:u32]
  WriteMem(Address),
  /// [OpCode:8][Reserved:32]
  Sgn
}

impl Instruction {
  pub fn operation(&self) -> Operation {
    match self {
      Instruction::LoadConst(_) => Operation::LoadConst,
      Instruction::ReadMem(_)   => Operation::ReadMem,
      Instruction::WriteMem(_)  => Operation::WriteMem,
      Instruction::Sgn          => Operation::Sgn
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::LoadConst(constant) => {
        write!(f, "{} {}", self.operation(), constant)
      }

      | Instruction::ReadMem(address)
      | Instruction::WriteMem(address) => {
        write!(f, "{} {}", self.operation(), address.value())
      }

      Instruction::Sgn => {
        write!(f, "{}", self.operation())
      }

    }
  }
}
