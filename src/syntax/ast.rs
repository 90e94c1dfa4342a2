use beef::lean::Cow;

pub type Ident<'src> = Cow<'src, str>;

#[cfg_attr(test, derive(Debug))]
#[derive(Clone, PartialEq, Default)]
pub struct Program<'src> {
  pub body: Vec<Command<'src>>,
}

/// One source line plus its optional indented body.
///
/// `body` is `Some` iff the line was followed by deeper-indented lines, and
/// is never `Some(vec![])`.
#[cfg_attr(test, derive(Debug))]
#[derive(Clone, PartialEq)]
pub struct Command<'src> {
  pub name: Ident<'src>,
  pub args: Vec<Argument<'src>>,
  pub body: Option<Vec<Command<'src>>>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone, PartialEq)]
pub enum Argument<'src> {
  /// A bare word.
  Ident(Ident<'src>),
  /// A double-quoted span, quotes stripped.
  Str(Ident<'src>),
  /// `{$name}`, resolved against the runtime state at execution time.
  Var(Ident<'src>),
  /// A word starting with `-`, dash retained.
  Opt(Ident<'src>),
}
