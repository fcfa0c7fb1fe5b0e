/*!

  A program is a flat stream of fixed-width instruction records with no header, magic number,
  length prefix, or trailer. Every record is 5 bytes:

    Opcode:   8 bits
    Operand: 32 bits, little-endian

  The operand is read according to the opcode. For `LOAD_CONST` it is a signed constant; for
  `READ_MEM` and `WRITE_MEM` it is an unsigned memory address; `SGN` takes no operand and
  encodes zero. Because the same four bytes have two readings, decoding never hands out an
  untyped operand: the opcode picks the `Instruction` variant and the variant carries a typed
  value.

  A program whose length is not a multiple of 5 is malformed.

*/

mod binary;
mod instruction;
mod assembly;

pub use binary::{encode_instruction, try_decode_instruction, encode_program, decode_program,
                 check_program_length, EncodedInstruction, INSTRUCTION_SIZE};
pub use instruction::{Instruction, Operation, OperandKind};
pub use assembly::{assemble, assemble_instruction, tokenize_line, Assembly, AssemblyRecord};
