/*!
  The human readable textual form of bytecode is called assembly. One instruction per line:
  a mnemonic followed by whitespace separated operands. Blank lines and lines starting with
  `#` are ignored. This module leverages the `strum` derives of `Operation` to look up
  mnemonics, so the instruction table is the `Operation` enum itself.
*/

use std::str::FromStr;

use nom::{
  IResult,
  bytes::complete::{take_while, take_while1},
  multi::many0,
  sequence::{preceded, terminated}
};

use crate::address::{Address, AddressNumberType};
use crate::bytecode::{encode_instruction, encode_program, EncodedInstruction, Instruction, Operation};
use crate::error::{Error, Result};

/// One assembled source line, kept for the assembly log.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct AssemblyRecord {
  /// 1-based source line number.
  pub line        : usize,
  pub mnemonic    : String,
  /// The operand tokens exactly as written.
  pub operands    : Vec<String>,
  pub instruction : Instruction,
  pub binary      : EncodedInstruction
}

/// The result of assembling a source text: the records in source order.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Assembly {
  records: Vec<AssemblyRecord>
}

impl Assembly {
  pub fn records(&self) -> &[AssemblyRecord] {
    &self.records
  }

  pub fn instructions(&self) -> Vec<Instruction> {
    self.records.iter().map(|record| record.instruction).collect()
  }

  /// The binary program: every record's bytes, concatenated.
  pub fn to_bytes(&self) -> Vec<u8> {
    encode_program(&self.instructions())
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
  terminated(
    many0(preceded(take_while(char::is_whitespace), take_while1(|c: char| !c.is_whitespace()))),
    take_while(char::is_whitespace)
  )(input)
}

/// Splits a source line on whitespace, including form feeds, vertical tabs, and Unicode spaces.
pub fn tokenize_line(line: &str) -> Vec<&str> {
  match tokens(line) {
    Ok((_rest, tokens)) => tokens,
    Err(_e) => vec![]
  }
}

fn parse_operand<T: FromStr>(operation: Operation, operands: &[&str]) -> Result<T> {
  let token = operands.first().ok_or_else(|| Error::MalformedOperand {
    mnemonic: operation.to_string(),
    operand: None
  })?;

  token.parse::<T>().map_err(|_| Error::MalformedOperand {
    mnemonic: operation.to_string(),
    operand: Some(token.to_string())
  })
}

/**
  Looks up `mnemonic` and parses the operands it needs. Operands past the instruction's
  arity are ignored.
*/
pub fn assemble_instruction(mnemonic: &str, operands: &[&str]) -> Result<Instruction> {
  let operation = Operation::from_str(mnemonic)
    .map_err(|_| Error::UnknownInstruction(mnemonic.to_string()))?;

  let instruction =
    match operation {
      Operation::LoadConst => {
        Instruction::LoadConst(parse_operand::<i32>(operation, operands)?)
      }
      Operation::ReadMem   => {
        Instruction::ReadMem(Address::from(parse_operand::<AddressNumberType>(operation, operands)?))
      }
      Operation::WriteMem  => {
        Instruction::WriteMem(Address::from(parse_operand::<AddressNumberType>(operation, operands)?))
      }
      Operation::Sgn       => Instruction::Sgn
    };

  Ok(instruction)
}

/**
  Assembles a whole source text. Assembly stops at the first error, which is reported with
  its source line; no partial result is returned.
*/
pub fn assemble(text: &str) -> Result<Assembly> {
  let mut assembly = Assembly::default();

  for (i, line) in text.lines().enumerate() {
    let tokens = tokenize_line(line);
    let (mnemonic, operands) =
      match tokens.split_first() {
        None                                        => continue,
        Some((first, _)) if first.starts_with('#') => continue,
        Some((first, rest))                         => (*first, rest)
      };

    let instruction = assemble_instruction(mnemonic, operands)
      .map_err(|e| Error::Assembly { line: i + 1, source: Box::new(e) })?;
    let binary = encode_instruction(instruction);

    #[cfg(feature = "trace_computation")]
      println!("{:>4}: {:<24} {}", i + 1, instruction, binary);

    assembly.records.push(
      AssemblyRecord {
        line: i + 1,
        mnemonic: mnemonic.to_string(),
        operands: operands.iter().map(|s| s.to_string()).collect(),
        instruction,
        binary
      }
    );
  }

  Ok(assembly)
}
