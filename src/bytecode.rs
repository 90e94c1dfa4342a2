mod builder;
mod chunk;
mod disasm;
mod opcode;

pub use builder::ChunkBuilder;
pub use chunk::{Chunk, Constant, NonNaNFloat};
pub use disasm::Disassembly;
pub use opcode::{Const, Instruction};
