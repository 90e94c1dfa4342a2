use beef::lean::Cow;

use super::ast;
use super::lexer::{Lexer, Token, TokenKind};

/// Parse `src` into a command tree. The first offense is fatal; there is no
/// error recovery.
pub fn parse(src: &str) -> Result<ast::Program<'_>, Error> {
  let lines = analyze(src)?;
  let mut body = Vec::new();
  let mut cursor = 0;
  block(&lines, &mut cursor, 0, &mut body)?;
  Ok(ast::Program { body })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error("invalid token `{lexeme}` on line {line}")]
  InvalidToken { lexeme: String, line: u32 },
  #[error("unterminated string `{lexeme}` on line {line}")]
  UnterminatedString { lexeme: String, line: u32 },
  #[error("invalid indentation ({width} spaces) on line {line}: `{text}`")]
  OddIndent { width: u32, line: u32, text: String },
  #[error("invalid indentation increase (level {from} to level {to}) on line {line}")]
  IndentJump { from: usize, to: usize, line: u32 },
  #[error("indentation error: cannot indent on an empty block (line {line})")]
  EmptyBlock { line: u32 },
  #[error("expected a command name, found `{found}` on line {line}")]
  ExpectedCommand { found: String, line: u32 },
  #[error("nesting limit reached on line {line}")]
  NestingLimit { line: u32 },
}

/// A logical source line: its indent level and the tokens on it.
///
/// Blank and comment-only lines never make it here.
struct Line<'src> {
  level: usize,
  number: u32,
  tokens: Vec<Token<'src>>,
}

fn analyze(src: &str) -> Result<Vec<Line<'_>>, Error> {
  let mut lines: Vec<Line> = Vec::new();
  for token in Lexer::new(src) {
    match token.kind {
      // The only way a quote fails to lex is a string that never closed.
      TokenKind::Error if token.lexeme.starts_with('"') => {
        return Err(Error::UnterminatedString {
          lexeme: token.lexeme.into(),
          line: token.line,
        })
      }
      TokenKind::Error => {
        return Err(Error::InvalidToken {
          lexeme: token.lexeme.into(),
          line: token.line,
        })
      }
      _ => {}
    }
    match token.ws {
      Some(width) => {
        if width % 2 != 0 {
          return Err(Error::OddIndent {
            width,
            line: token.line,
            text: raw_line(src, token.line),
          });
        }
        lines.push(Line {
          level: (width / 2) as usize,
          number: token.line,
          tokens: vec![token],
        });
      }
      None => match lines.last_mut() {
        Some(line) => line.tokens.push(token),
        None => unreachable!("token before the start of a line"),
      },
    }
  }
  Ok(lines)
}

fn raw_line(src: &str, number: u32) -> String {
  src.lines().nth(number as usize - 1).unwrap_or("").to_owned()
}

/// Append commands at `level` to `body`, descending into the body of the
/// last command whenever the next line indents by exactly one level.
fn block<'src>(
  lines: &[Line<'src>],
  cursor: &mut usize,
  level: usize,
  body: &mut Vec<ast::Command<'src>>,
) -> Result<(), Error> {
  while let Some(line) = lines.get(*cursor) {
    if line.level < level {
      return Ok(());
    }
    if line.level > level {
      if line.level != level + 1 {
        return Err(Error::IndentJump {
          from: level,
          to: line.level,
          line: line.number,
        });
      }
      let Some(parent) = body.last_mut() else {
        return Err(Error::EmptyBlock { line: line.number });
      };
      check_recursion_limit(line.number)?;
      block(lines, cursor, level + 1, parent.body.get_or_insert_with(Vec::new))?;
      continue;
    }
    body.push(command(line)?);
    *cursor += 1;
  }
  Ok(())
}

fn command<'src>(line: &Line<'src>) -> Result<ast::Command<'src>, Error> {
  let mut tokens = line.tokens.iter();
  let name = match tokens.next() {
    Some(token) if token.kind == TokenKind::Word => Cow::borrowed(token.lexeme),
    Some(token) => {
      return Err(Error::ExpectedCommand {
        found: token.lexeme.into(),
        line: line.number,
      })
    }
    None => unreachable!("empty line survived analysis"),
  };
  Ok(ast::Command {
    name,
    args: tokens.map(argument).collect(),
    body: None,
  })
}

/// Classify one token: substitution, then string, then option, then a bare
/// identifier. The whole token must match; `{$}` and `{$a{b}` fall through
/// to identifiers.
fn argument<'src>(token: &Token<'src>) -> ast::Argument<'src> {
  if let TokenKind::Str = token.kind {
    let interior = &token.lexeme[1..token.lexeme.len() - 1];
    return ast::Argument::Str(Cow::borrowed(interior));
  }
  if let Some(name) = substitution(token.lexeme) {
    return ast::Argument::Var(Cow::borrowed(name));
  }
  if token.lexeme.starts_with('-') {
    return ast::Argument::Opt(Cow::borrowed(token.lexeme));
  }
  ast::Argument::Ident(Cow::borrowed(token.lexeme))
}

fn substitution(lexeme: &str) -> Option<&str> {
  let interior = lexeme.strip_prefix("{$")?.strip_suffix('}')?;
  if interior.is_empty() || interior.contains(|c| c == '{' || c == '}') {
    return None;
  }
  Some(interior)
}

#[cfg(feature = "check-recursion-limit")]
fn check_recursion_limit(line: u32) -> Result<(), Error> {
  // `block` recurses once per indent level; keep a generous margin.
  const MINIMUM_STACK_REQUIRED: usize = 32_000;

  if stacker::remaining_stack()
    .map(|available| available > MINIMUM_STACK_REQUIRED)
    .unwrap_or(true)
  {
    Ok(())
  } else {
    Err(Error::NestingLimit { line })
  }
}

#[cfg(not(feature = "check-recursion-limit"))]
fn check_recursion_limit(_line: u32) -> Result<(), Error> {
  Ok(())
}
