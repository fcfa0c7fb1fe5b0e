/*!
  A two stage toolchain for a small stack bytecode. The assembler turns source text into a
  flat stream of 5 byte instruction records; the `VM` executes that stream against a stack
  and a fixed-size memory and reports the nonzero memory cells.

  ```text
  source text -> [`bytecode::assemble`] -> bytes -> [`VM::run`] -> `VM::snapshot`
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod error;
pub mod report;
pub mod vm;

use std::fs;
use std::path::Path;

pub use crate::bytecode::{assemble, Assembly, Instruction, Operation};
pub use crate::error::{Error, Result};
pub use crate::vm::{VM, DEFAULT_MEMORY_SIZE};

/**
  Writes every output, or none of them: if a write fails, the files already written by this
  call are removed again.
*/
fn write_outputs(outputs: &[(&Path, &[u8])]) -> Result<()> {
  for (i, (path, contents)) in outputs.iter().enumerate() {
    if let Err(e) = fs::write(path, contents) {
      for (written, _) in &outputs[..i] {
        let _ = fs::remove_file(written);
      }
      return Err(e.into());
    }
  }
  Ok(())
}

/**
  Assembles the file at `source` and writes the program to `binary_out` and the assembly log
  to `log_out`. Nothing is written unless the whole source assembles and both files can be
  written.
*/
pub fn assemble_file<P, Q, R>(source: P, binary_out: Q, log_out: R) -> Result<Assembly>
  where P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>
{
  let text     = fs::read_to_string(source)?;
  let assembly = assemble(&text)?;
  let binary   = assembly.to_bytes();
  let log      = report::to_csv_string(&report::assembly_table(&assembly))?;

  write_outputs(&[
    (binary_out.as_ref(), binary.as_slice()),
    (log_out.as_ref(),    log.as_bytes())
  ])?;

  #[cfg(feature = "trace_computation")]
    println!("Assembled {} instructions.", assembly.len());

  Ok(assembly)
}

/**
  Runs the program at `binary` on a fresh machine with `memory_size` cells and writes the
  nonzero memory cells to `result_out`. Nothing is written if the program fails.
*/
pub fn execute_file<P, Q>(binary: P, result_out: Q, memory_size: usize) -> Result<Vec<(usize, i32)>>
  where P: AsRef<Path>,
        Q: AsRef<Path>
{
  let program = fs::read(binary)?;

  let mut machine = VM::try_new(memory_size)?;
  machine.run(&program)?;
  let snapshot = machine.snapshot();

  report::write_csv(&report::result_table(&snapshot), result_out)?;

  #[cfg(feature = "trace_computation")]
    println!("{}", machine);

  Ok(snapshot)
}

/// Decodes the program at `binary` without running it, paired with each record's byte offset.
pub fn disassemble_file<P: AsRef<Path>>(binary: P) -> Result<Vec<(usize, Instruction)>> {
  let program = fs::read(binary)?;
  let instructions = bytecode::decode_program(&program)?;

  Ok(
    instructions
      .into_iter()
      .enumerate()
      .map(|(i, instruction)| (i * bytecode::INSTRUCTION_SIZE, instruction))
      .collect()
  )
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bytevm-{}-{}", std::process::id(), name))
  }

  #[test]
  fn assemble_then_execute(){
    let source = scratch("program.asm");
    let binary = scratch("program.bin");
    let log    = scratch("program-log.csv");
    let result = scratch("program-result.csv");

    fs::write(&source, "\
# sign of a negative number
LOAD_CONST -10
SGN
WRITE_MEM 5

LOAD_CONST 256
WRITE_MEM 1017
READ_MEM 1017
SGN
WRITE_MEM 0
").unwrap();

    let assembly = assemble_file(&source, &binary, &log).unwrap();
    assert_eq!(assembly.len(), 8);
    assert_eq!(fs::read(&binary).unwrap().len(), 40);
    assert!(fs::read_to_string(&log).unwrap().starts_with("mnemonic,operands,binary\nLOAD_CONST,-10,00f6ffffff\n"));

    let snapshot = execute_file(&binary, &result, DEFAULT_MEMORY_SIZE).unwrap();
    assert_eq!(snapshot, vec![(0, 1), (5, -1), (1017, 256)]);
    assert_eq!(fs::read_to_string(&result).unwrap(), "Address,Value\n0,1\n5,-1\n1017,256\n");

    for path in &[source, binary, log, result] {
      fs::remove_file(path).unwrap();
    }
  }

  #[test]
  fn failed_assembly_writes_nothing(){
    let source = scratch("bad.asm");
    let binary = scratch("bad.bin");
    let log    = scratch("bad-log.csv");

    fs::write(&source, "LOAD_CONST 1\nPUSH 2\n").unwrap();
    let error = assemble_file(&source, &binary, &log).unwrap_err();
    assert_eq!(error.root(), &Error::UnknownInstruction("PUSH".to_string()));
    assert!(!binary.exists());
    assert!(!log.exists());

    fs::remove_file(&source).unwrap();
  }

  #[test]
  fn failed_execution_writes_nothing(){
    let binary = scratch("overflow.bin");
    let result = scratch("overflow-result.csv");

    // WRITE_MEM 4 on a 4 cell memory.
    let program: [u8; 10] = [0x00, 0x01, 0x00, 0x00, 0x00, 0xA2, 0x04, 0x00, 0x00, 0x00];
    fs::write(&binary, &program[..]).unwrap();
    let error = execute_file(&binary, &result, 4).unwrap_err();
    assert!(matches!(error.root(), Error::OutOfBounds { .. }));
    assert!(!result.exists());

    fs::remove_file(&binary).unwrap();
  }

  #[test]
  fn unwritable_log_leaves_no_binary(){
    let source = scratch("unwritable.asm");
    let binary = scratch("unwritable.bin");
    let log    = scratch("no-such-directory").join("log.csv");

    fs::write(&source, "LOAD_CONST 256\nWRITE_MEM 0\n").unwrap();
    let error = assemble_file(&source, &binary, &log).unwrap_err();
    assert!(matches!(error, Error::Io(_)));
    assert!(!binary.exists());
    assert!(!log.exists());

    fs::remove_file(&source).unwrap();
  }

  #[test]
  fn oversized_memory_is_an_error(){
    let binary = scratch("oversized.bin");
    let result = scratch("oversized-result.csv");

    fs::write(&binary, bytecode::encode_program(&[Instruction::Sgn])).unwrap();
    let error = execute_file(&binary, &result, usize::max_value()).unwrap_err();
    assert_eq!(error, Error::MemoryAllocation(usize::max_value()));
    assert!(!result.exists());

    fs::remove_file(&binary).unwrap();
  }

  #[test]
  fn disassemble(){
    let binary = scratch("disassemble.bin");

    fs::write(&binary, bytecode::encode_program(&[
      Instruction::LoadConst(-3),
      Instruction::Sgn,
      Instruction::WriteMem(address::Address::from(2)),
    ])).unwrap();
    let listing = disassemble_file(&binary).unwrap();
    let text: Vec<String> = listing.iter().map(|(offset, i)| format!("{}: {}", offset, i)).collect();
    assert_eq!(text, vec!["0: LOAD_CONST -3", "5: SGN", "10: WRITE_MEM 2"]);

    fs::write(&binary, [0x01u8, 0x00, 0x00, 0x00, 0x00, 0x7F, 0x00, 0x00, 0x00, 0x00]).unwrap();
    let error = disassemble_file(&binary).unwrap_err();
    assert!(matches!(error, Error::Execution { offset: 5, .. }));
    assert_eq!(error.root(), &Error::UnknownOpcode(0x7F));

    fs::remove_file(&binary).unwrap();
  }

  #[test]
  fn missing_file(){
    let error = execute_file(scratch("does-not-exist.bin"), scratch("unused.csv"), 8).unwrap_err();
    assert!(matches!(error, Error::Io(_)));
  }

}
