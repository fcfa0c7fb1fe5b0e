//! Tabular output: the assembly log and the execution result, written as CSV.

use std::fs::File;
use std::path::Path;

use prettytable::Table;

use crate::bytecode::Assembly;
use crate::error::{Error, Result};

/// One row per assembled instruction: mnemonic, the operand tokens as written, and the hex bytes.
pub fn assembly_table(assembly: &Assembly) -> Table {
  let mut table = Table::new();
  table.set_titles(row!["mnemonic", "operands", "binary"]);

  for record in assembly.records() {
    table.add_row(row![record.mnemonic, record.operands.join(" "), record.binary.to_hex()]);
  }
  table
}

/// One row per `(address, value)` pair of a memory snapshot.
pub fn result_table(snapshot: &[(usize, i32)]) -> Table {
  let mut table = Table::new();
  table.set_titles(row!["Address", "Value"]);

  for (address, value) in snapshot {
    table.add_row(row![address, value]);
  }
  table
}

/// Writes the table, title row first, as CSV. An existing file is replaced.
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
  let file = File::create(path)?;
  table.to_csv(file).map_err(|e| Error::Io(e.to_string()))?;
  Ok(())
}

/// Renders the table as CSV text.
pub fn to_csv_string(table: &Table) -> Result<String> {
  let mut buffer: Vec<u8> = Vec::new();
  table.to_csv(&mut buffer).map_err(|e| Error::Io(e.to_string()))?;
  String::from_utf8(buffer).map_err(|e| Error::Io(e.to_string()))
}
