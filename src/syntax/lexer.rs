use logos::Logos;

/// A lexeme together with the indentation of the line it opens.
///
/// `ws` is `Some(width)` when the token is the first on its physical line,
/// where `width` counts the leading ASCII spaces of that line. Tokens further
/// into the line carry `None`.
#[derive(Clone, Copy, Debug)]
pub struct Token<'src> {
  pub ws: Option<u32>,
  pub line: u32,
  pub kind: TokenKind,
  pub lexeme: &'src str,
}

#[derive(Clone, Copy, Debug, Logos, PartialEq, Eq)]
pub enum TokenKind {
  /// `"..."`, closed on the same line, no escape sequences.
  #[regex(r#""[^"\n]*""#, priority = 6)]
  Str,
  /// A maximal run of non-whitespace characters. A quote opens a string
  /// span instead, so words never start with one (they may contain one).
  #[regex(r#"[^\s"]\S*"#, priority = 3)]
  Word,

  #[doc(hidden)]
  #[regex(r"(\r?\n)+[ ]*", priority = 10)]
  _Indent,
  #[doc(hidden)]
  #[regex(r"[ \t\r]+")]
  _Whitespace,
  #[doc(hidden)]
  #[regex(r"#[^\n]*", priority = 6)]
  _Comment,

  Error,
}

pub struct Lexer<'src> {
  inner: logos::Lexer<'src, TokenKind>,
  ws: Option<u32>,
  line: u32,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src str) -> Self {
    // The `_Indent` pattern only fires after a newline, so the first line's
    // indentation is measured up front.
    let leading = src.bytes().take_while(|&b| b == b' ').count() as u32;
    Self {
      inner: TokenKind::lexer(src),
      ws: Some(leading),
      line: 1,
    }
  }
}

impl<'src> Iterator for Lexer<'src> {
  type Item = Token<'src>;

  fn next(&mut self) -> Option<Token<'src>> {
    while let Some(kind) = self.inner.next() {
      let lexeme = self.inner.slice();
      match kind {
        // Measure indentation
        Ok(TokenKind::_Indent) => {
          self.line += lexeme.matches('\n').count() as u32;
          self.ws = Some(measure_indent(lexeme));
        }
        // Filter any other whitespace and comments
        Ok(TokenKind::_Whitespace | TokenKind::_Comment) => continue,
        // Return any other token with its preceding indentation
        Ok(kind) => {
          return Some(Token {
            ws: self.ws.take(),
            line: self.line,
            kind,
            lexeme,
          });
        }
        Err(()) => {
          return Some(Token {
            ws: self.ws.take(),
            line: self.line,
            kind: TokenKind::Error,
            lexeme,
          });
        }
      }
    }

    None
  }
}

fn measure_indent(s: &str) -> u32 {
  let pos = s.rfind('\n').unwrap_or(0);
  (s.len() - pos - 1) as u32
}
