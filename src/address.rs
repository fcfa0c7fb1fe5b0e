//! A memory address as it appears in the operand field of `READ_MEM` and `WRITE_MEM`.

use std::fmt::{Display, Formatter};

// Addresses are the unsigned reading of the 32 bit operand field.
pub type AddressNumberType = u32;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(AddressNumberType);

impl Address {
  /// Converts the address to an index into the memory vector.
  pub fn idx(&self) -> usize {
    self.0 as usize
  }

  /// The raw operand value.
  pub fn value(&self) -> AddressNumberType {
    self.0
  }

  /// Whether the address is a valid index into a memory of `memory_size` cells.
  pub fn is_within(&self, memory_size: usize) -> bool {
    self.idx() < memory_size
  }
}

impl From<AddressNumberType> for Address {
  fn from(value: AddressNumberType) -> Address {
    Address(value)
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "MEM[{}]", self.0)
  }
}
