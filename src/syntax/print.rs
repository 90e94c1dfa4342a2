use std::fmt::{self, Write};

use super::ast::{Argument, Command, Program};

// Re-parsing the output yields a structurally equal program; comments and
// blank lines do not survive.
impl fmt::Display for Program<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for command in &self.body {
      write_command(f, command, 0)?;
    }
    Ok(())
  }
}

fn write_command(f: &mut fmt::Formatter<'_>, command: &Command<'_>, depth: usize) -> fmt::Result {
  for _ in 0..depth {
    f.write_str("  ")?;
  }
  f.write_str(&command.name)?;
  for argument in &command.args {
    f.write_char(' ')?;
    match argument {
      Argument::Ident(v) | Argument::Opt(v) => f.write_str(v)?,
      Argument::Str(v) => write!(f, "\"{v}\"")?,
      Argument::Var(v) => write!(f, "{{${v}}}")?,
    }
  }
  f.write_char('\n')?;
  if let Some(body) = &command.body {
    for child in body {
      write_command(f, child, depth + 1)?;
    }
  }
  Ok(())
}
