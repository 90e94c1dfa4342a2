use indexmap::IndexMap;

use super::chunk::{Chunk, Constant};
use super::opcode::{Const, Instruction};

/// Accumulates one chunk's instructions and constants. Nested blocks use a
/// fresh builder; pools are never shared across chunk boundaries.
#[derive(Default)]
pub struct ChunkBuilder {
  instructions: Vec<Instruction>,
  constants: ConstantPoolBuilder,
}

impl ChunkBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn emit(&mut self, instruction: Instruction) {
    self.instructions.push(instruction);
  }

  /// Add `value` to the pool, reusing a structurally equal entry if present.
  pub fn constant(&mut self, value: Constant) -> Const {
    self.constants.insert(value)
  }

  pub fn finish(self) -> Chunk {
    Chunk {
      instructions: self.instructions,
      constants: self.constants.constants,
    }
  }
}

#[derive(Default)]
struct ConstantPoolBuilder {
  constants: Vec<Constant>,
  index: IndexMap<Constant, usize>,
}

impl ConstantPoolBuilder {
  fn insert(&mut self, value: Constant) -> Const {
    // Each block is freshly constructed and never structurally equal to
    // another site's, so chunks skip the dedup lookup.
    if let Constant::Chunk(_) = value {
      let index = self.constants.len();
      self.constants.push(value);
      return Const(index as u32);
    }
    if let Some(&index) = self.index.get(&value) {
      return Const(index as u32);
    }
    let index = self.constants.len();
    self.constants.push(value.clone());
    self.index.insert(value, index);
    Const(index as u32)
  }
}
