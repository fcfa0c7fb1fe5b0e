/*!
  This module is responsible for the encoding and decoding of binary instructions.

*/
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use super::{Operation, Instruction};
use crate::address::Address;
use crate::error::{Error, Result};

// If you change this you must also change `encode_instruction` and `try_decode_instruction`.
pub const INSTRUCTION_SIZE: usize = 5;
pub const OPERAND_SIZE: usize = INSTRUCTION_SIZE - 1;

/// An encoded instruction record, `[OpCode:8][Operand:32 LE]`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct EncodedInstruction([u8; INSTRUCTION_SIZE]);

impl EncodedInstruction {
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  /// Lowercase hexadecimal, two digits per byte, no separators.
  pub fn to_hex(&self) -> String {
    self.0
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<String>>()
        .join("")
  }
}

impl Display for EncodedInstruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.to_hex())
  }
}

/**
  Decodes exactly one instruction record. The operand bytes are read as a signed constant or
  an unsigned address depending on the opcode.
*/
pub fn try_decode_instruction(record: &[u8]) -> Result<Instruction> {
  if record.len() != INSTRUCTION_SIZE {
    return Err(Error::MalformedStream(record.len()));
  }

  let opcode = Operation::try_from(record[0]).map_err(|_| Error::UnknownOpcode(record[0]))?;
  let mut operand = [0u8; OPERAND_SIZE];
  operand.copy_from_slice(&record[1..]);

  let instruction =
    match opcode {
      Operation::LoadConst => Instruction::LoadConst(i32::from_le_bytes(operand)),
      Operation::ReadMem   => Instruction::ReadMem(Address::from(u32::from_le_bytes(operand))),
      Operation::WriteMem  => Instruction::WriteMem(Address::from(u32::from_le_bytes(operand))),
      Operation::Sgn       => Instruction::Sgn
    };

  Ok(instruction)
}

/// Encodes the instruction into its 5 byte record.
pub fn encode_instruction(instruction: Instruction) -> EncodedInstruction {
  let operand: [u8; OPERAND_SIZE] =
    match instruction {
      Instruction::LoadConst(constant) => constant.to_le_bytes(),
      | Instruction::ReadMem(address)
      | Instruction::WriteMem(address) => address.value().to_le_bytes(),
      Instruction::Sgn                 => 0u32.to_le_bytes()
    };

  let mut record = [0u8; INSTRUCTION_SIZE];
  record[0] = instruction.operation().code();
  record[1..].copy_from_slice(&operand);
  EncodedInstruction(record)
}

/// Concatenates the encoded instructions with no header or separators.
pub fn encode_program(instructions: &[Instruction]) -> Vec<u8> {
  let mut program = Vec::with_capacity(instructions.len() * INSTRUCTION_SIZE);
  for instruction in instructions {
    program.extend_from_slice(encode_instruction(*instruction).as_bytes());
  }
  program
}

/// Checks that `program` is a whole number of instruction records.
pub fn check_program_length(program: &[u8]) -> Result<()> {
  match program.len() % INSTRUCTION_SIZE {
    0 => Ok(()),
    _ => Err(Error::MalformedStream(program.len()))
  }
}

/**
  Decodes an entire program. An unknown opcode is reported with the byte offset of its
  record.
*/
pub fn decode_program(program: &[u8]) -> Result<Vec<Instruction>> {
  check_program_length(program)?;

  program
    .chunks(INSTRUCTION_SIZE)
    .enumerate()
    .map(|(i, record)| {
      try_decode_instruction(record).map_err(|e| Error::Execution {
        offset: i * INSTRUCTION_SIZE,
        source: Box::new(e)
      })
    })
    .collect()
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn load_const_layout(){
    let encoded = encode_instruction(Instruction::LoadConst(256));
    assert_eq!(encoded.as_bytes(), &[0x00, 0x00, 0x01, 0x00, 0x00]);
    assert_eq!(encoded.to_hex(), "0000010000");
  }

  #[test]
  fn constants_are_signed(){
    let encoded = encode_instruction(Instruction::LoadConst(-1));
    assert_eq!(encoded.as_bytes(), &[0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(
      try_decode_instruction(encoded.as_bytes()),
      Ok(Instruction::LoadConst(-1))
    );

    for &constant in &[i32::min_value(), -65536, 0, 1, i32::max_value()] {
      let encoded = encode_instruction(Instruction::LoadConst(constant));
      assert_eq!(
        try_decode_instruction(encoded.as_bytes()),
        Ok(Instruction::LoadConst(constant))
      );
    }
  }

  #[test]
  fn addresses_are_unsigned(){
    // The same bytes that read as -1 for `LOAD_CONST` are address 4294967295 here.
    let record: [u8; 5] = [0xCE, 0xFF, 0xFF, 0xFF, 0xFF];
    assert_eq!(
      try_decode_instruction(&record),
      Ok(Instruction::ReadMem(Address::from(u32::max_value())))
    );

    let encoded = encode_instruction(Instruction::WriteMem(Address::from(1017)));
    assert_eq!(encoded.as_bytes(), &[0xA2, 0xF9, 0x03, 0x00, 0x00]);
  }

  #[test]
  fn each_opcode_decodes_to_its_own_variant(){
    let operand = [0x07, 0x00, 0x00, 0x00];
    for &(opcode, expected) in &[
      (0x00u8, Instruction::LoadConst(7)),
      (0xCE,   Instruction::ReadMem(Address::from(7))),
      (0xA2,   Instruction::WriteMem(Address::from(7))),
      (0x01,   Instruction::Sgn),
    ] {
      let mut record = [opcode, 0, 0, 0, 0];
      record[1..].copy_from_slice(&operand);
      let decoded = try_decode_instruction(&record).unwrap();
      assert_eq!(decoded, expected);
      assert_eq!(decoded.operation().code(), opcode);
    }
  }

  #[test]
  fn sgn_operand_is_zero(){
    let encoded = encode_instruction(Instruction::Sgn);
    assert_eq!(encoded.as_bytes(), &[0x01, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(try_decode_instruction(&[0x01, 0x12, 0x34, 0x00, 0x00]), Ok(Instruction::Sgn));
  }

  #[test]
  fn unknown_opcode(){
    assert_eq!(
      try_decode_instruction(&[0x02, 0x00, 0x00, 0x00, 0x00]),
      Err(Error::UnknownOpcode(0x02))
    );
  }

  #[test]
  fn wrong_record_size(){
    assert_eq!(try_decode_instruction(&[0x00, 0x01]), Err(Error::MalformedStream(2)));
  }

  #[test]
  fn program_round_trip(){
    let instructions = vec![
      Instruction::LoadConst(-10),
      Instruction::Sgn,
      Instruction::WriteMem(Address::from(3)),
      Instruction::ReadMem(Address::from(3)),
    ];
    let program = encode_program(&instructions);
    assert_eq!(program.len(), 4 * INSTRUCTION_SIZE);
    assert_eq!(decode_program(&program), Ok(instructions));
  }

  #[test]
  fn program_errors(){
    assert_eq!(decode_program(&[0u8; 7]), Err(Error::MalformedStream(7)));

    let mut program = encode_program(&[Instruction::Sgn, Instruction::Sgn]);
    program[5] = 0xFF;
    let error = decode_program(&program).unwrap_err();
    assert_eq!(
      error,
      Error::Execution { offset: 5, source: Box::new(Error::UnknownOpcode(0xFF)) }
    );
  }

}
