//! The stack machine that executes binary programs against a fixed-size memory.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::address::Address;
use crate::bytecode::*;
use crate::error::{Error, Result};

pub const DEFAULT_MEMORY_SIZE: usize = 1024;

/**
  A virtual machine owns its stack and its memory. It executes at most one program with
  `run`; afterward `snapshot` reads the result out of memory. Single instructions can be
  executed directly against a hand-prepared state with `execute_binary` and
  `execute_instruction`.
*/
#[derive(Clone, Debug)]
pub struct VM {
  // Memory Stores
  stack  : Vec<i32>, // Operand stack, last in first out
  memory : Vec<i32>, // Fixed-size data memory, zero initialized

  // Registers //
  ip     : usize,    // Instruction pointer, a byte offset into the running program
  halted : bool      // Set once a program has run to completion or failed
}

impl Default for VM {
  fn default() -> VM {
    VM::new(DEFAULT_MEMORY_SIZE)
  }
}

impl VM {

  // region Display methods

  fn make_memory_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (address, value) in self.snapshot() {
      table.add_row(row![r->format!("MEM[{}] =", address), value]);
    }
    table
  }

  fn make_stack_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Depth", ubl->"Contents"]);

    // Top of stack first.
    for (depth, value) in self.stack.iter().rev().enumerate() {
      match depth == 0 {

        true  => {
          table.add_row(row![r->"* --> 0 =", value]);
        }

        false => {
          table.add_row(row![r->format!("{} =", depth), value]);
        }

      }
    }
    table
  }

  // endregion

  // region State access

  /// Panics if the memory cannot be allocated. Use `try_new` for sizes that come from input.
  pub fn new(memory_size: usize) -> VM {
    VM {
      stack  : vec![],
      memory : vec![0; memory_size],
      ip     : 0,
      halted : false
    }
  }

  /// Like `new`, but reports a memory size that cannot be allocated as an error.
  pub fn try_new(memory_size: usize) -> Result<VM> {
    let mut memory: Vec<i32> = Vec::new();
    memory.try_reserve_exact(memory_size)
          .map_err(|_| Error::MemoryAllocation(memory_size))?;
    memory.resize(memory_size, 0);

    Ok(VM {
      stack  : vec![],
      memory,
      ip     : 0,
      halted : false
    })
  }

  pub fn memory_size(&self) -> usize {
    self.memory.len()
  }

  pub fn stack(&self) -> &[i32] {
    &self.stack
  }

  /// The top of the stack, if any.
  pub fn top(&self) -> Option<i32> {
    self.stack.last().copied()
  }

  pub fn push(&mut self, value: i32) {
    self.stack.push(value);
  }

  pub fn memory(&self) -> &[i32] {
    &self.memory
  }

  pub fn memory_mut(&mut self) -> &mut [i32] {
    &mut self.memory
  }

  /// Byte offset of the next record to execute.
  pub fn ip(&self) -> usize {
    self.ip
  }

  /**
    The result of a run: every `(address, value)` pair with a nonzero value, in ascending
    address order. Zero cells are left out of the report, not out of memory.
  */
  pub fn snapshot(&self) -> Vec<(usize, i32)> {
    self.memory
        .iter()
        .enumerate()
        .filter(|(_, value)| **value != 0)
        .map(|(address, value)| (address, *value))
        .collect()
  }

  // endregion

  // region Interpretation

  /**
    Executes a whole program, one 5 byte record at a time, from the first byte to the last.
    The length is checked before anything executes. The first error aborts the run and is
    reported with the byte offset of its record.
  */
  pub fn run(&mut self, program: &[u8]) -> Result<()> {
    if self.halted {
      return Err(Error::AlreadyRun);
    }
    self.halted = true;
    check_program_length(program)?;

    #[cfg(feature = "trace_computation")]
      println!("Running {} bytes of bytecode.\n{}", program.len(), self);

    while self.ip < program.len() {
      let offset = self.ip;
      let record = &program[offset..offset + INSTRUCTION_SIZE];
      self.ip += INSTRUCTION_SIZE;

      self.execute_binary(record)
          .map_err(|e| Error::Execution { offset, source: Box::new(e) })?;
    }

    Ok(())
  }

  /// Decodes and executes exactly one instruction record.
  pub fn execute_binary(&mut self, record: &[u8]) -> Result<()> {
    let instruction = try_decode_instruction(record)?;
    self.execute_instruction(instruction)
  }

  pub fn execute_instruction(&mut self, instruction: Instruction) -> Result<()> {
    #[cfg(feature = "trace_computation")] println!("{}", instruction);

    match instruction {
      Instruction::LoadConst(constant) => self.load_const(constant),
      Instruction::ReadMem(address)    => self.read_mem(address)?,
      Instruction::WriteMem(address)   => self.write_mem(address)?,
      Instruction::Sgn                 => self.sgn()?
    }

    #[cfg(feature = "trace_computation")] println!("{}", self);

    Ok(())
  }

  // endregion

  // region VM instruction methods

  fn pop(&mut self, operation: Operation) -> Result<i32> {
    self.stack.pop().ok_or(Error::StackUnderflow(operation))
  }

  fn check_address(&self, operation: Operation, address: Address) -> Result<usize> {
    match address.is_within(self.memory.len()) {
      true  => Ok(address.idx()),
      false => Err(Error::OutOfBounds { operation, address, memory_size: self.memory.len() })
    }
  }

  /// Push a constant onto the stack.
  fn load_const(&mut self, constant: i32) {
    self.stack.push(constant);
  }

  /// Push the value at `address` onto the stack.
  fn read_mem(&mut self, address: Address) -> Result<()> {
    let idx = self.check_address(Operation::ReadMem, address)?;
    self.stack.push(self.memory[idx]);
    Ok(())
  }

  /**
    Pop the top of the stack into `address`. The address is checked before the stack, so an
    out of bounds write leaves the stack untouched.
  */
  fn write_mem(&mut self, address: Address) -> Result<()> {
    let idx = self.check_address(Operation::WriteMem, address)?;
    self.memory[idx] = self.pop(Operation::WriteMem)?;
    Ok(())
  }

  /// Replace the top of the stack with its sign: 1, -1, or 0.
  fn sgn(&mut self) -> Result<()> {
    let value = self.pop(Operation::Sgn)?;
    self.stack.push(value.signum());
    Ok(())
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for VM {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let s_table = self.make_stack_table();
    let m_table = self.make_memory_table();

    let mut combined_table = table!([s_table, m_table]);

    combined_table.set_titles(row![ub->"Stack", ub->"Memory (nonzero)"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "IP: {}\tMemory size: {}\n{}", self.ip, self.memory.len(), combined_table)
  }
}
