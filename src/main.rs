use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use bytevm::{assemble_file, disassemble_file, execute_file, Result, DEFAULT_MEMORY_SIZE};

/// Assembler and interpreter for 5 byte stack bytecode.
#[derive(Parser, Debug)]
#[command(name = "bytevm", version, about)]
struct Cli {
  #[command(subcommand)]
  command: Command
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Assemble a source file into a binary program and a CSV assembly log.
  Assemble {
    /// Assembly source, one instruction per line.
    source: PathBuf,
    /// Where to write the binary program.
    binary: PathBuf,
    /// Where to write the assembly log.
    log: PathBuf
  },
  /// Execute a binary program and write the nonzero memory cells as CSV.
  Execute {
    /// The binary program.
    binary: PathBuf,
    /// Where to write the result table.
    result: PathBuf,
    /// Number of memory cells.
    #[arg(default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize
  },
  /// List the instructions of a binary program without running it.
  Disassemble {
    /// The binary program.
    binary: PathBuf
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {

    Command::Assemble { source, binary, log } => {
      let assembly = assemble_file(&source, &binary, &log)?;
      println!(
        "Assembled {} instructions into {}; log written to {}",
        assembly.len(), binary.display(), log.display()
      );
    }

    Command::Execute { binary, result, memory_size } => {
      execute_file(&binary, &result, memory_size)?;
      println!("Result written to {}", result.display());
    }

    Command::Disassemble { binary } => {
      for (offset, instruction) in disassemble_file(&binary)? {
        println!("{:>6}: {}", offset, instruction);
      }
    }

  }
  Ok(())
}

fn main() {
  #[cfg(feature = "trace_computation")]
  println!("Computation Tracing ENABLED");

  if let Err(e) = run(Cli::parse()) {
    eprintln!("Error: {}", e);
    process::exit(1);
  }
}
