use std::fmt::{self, Display};

use super::chunk::{Chunk, Constant};
use super::opcode::{Const, Instruction};

impl Chunk {
  pub fn disassemble(&self) -> Disassembly<'_> {
    Disassembly { chunk: self }
  }
}

/// Human-readable listing of a chunk, its pool, and every nested block.
pub struct Disassembly<'a> {
  chunk: &'a Chunk,
}

impl Display for Disassembly<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (offset, instruction) in self.chunk.instructions.iter().enumerate() {
      write!(f, "{offset:>4}  ")?;
      write_instruction(f, instruction, &self.chunk.constants)?;
      writeln!(f)?;
    }
    for (index, constant) in self.chunk.constants.iter().enumerate() {
      if let Constant::Chunk(block) = constant {
        writeln!(f, "\nblock [{index}]:")?;
        Display::fmt(&block.disassemble(), f)?;
      }
    }
    Ok(())
  }
}

fn write_instruction(
  f: &mut fmt::Formatter<'_>,
  instruction: &Instruction,
  constants: &[Constant],
) -> fmt::Result {
  let note = |f: &mut fmt::Formatter<'_>, index: Const| -> fmt::Result {
    match constants.get(index.index()) {
      Some(constant) => write!(f, " ; {constant}"),
      None => write!(f, " ; <out of bounds>"),
    }
  };

  match instruction {
    Instruction::PushConst(k) => {
      write!(f, "push_const {k}")?;
      note(f, *k)
    }
    Instruction::PushVar(k) => {
      write!(f, "push_var {k}")?;
      note(f, *k)
    }
    Instruction::Pop => f.write_str("pop"),
    Instruction::SetState => f.write_str("set_state"),
    Instruction::BuildObj(n) => write!(f, "build_obj {n}"),
    Instruction::CreateWidget => f.write_str("create_widget"),
    Instruction::UpdateWidget => f.write_str("update_widget"),
    Instruction::PackWidget => f.write_str("pack_widget"),
    Instruction::DefBlock(k) => write!(f, "def_block {k}"),
    Instruction::BindWidget(n) => write!(f, "bind_widget {n}"),
    Instruction::WatchState => f.write_str("watch_state"),
    Instruction::DefProc(n) => write!(f, "def_proc {n}"),
    Instruction::CallProc(n) => write!(f, "call_proc {n}"),
    Instruction::HttpGet(n) => write!(f, "http_get {n}"),
  }
}
