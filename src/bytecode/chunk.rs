use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::discriminant;
use std::rc::Rc;

use indexmap::IndexMap;

use super::opcode::Instruction;

/// An executable unit: a flat instruction sequence plus the constant pool its
/// operands index. Blocks compile to chunks stored inside the enclosing pool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chunk {
  pub instructions: Vec<Instruction>,
  pub constants: Vec<Constant>,
}

#[derive(Clone, Debug)]
pub enum Constant {
  String(Rc<str>),
  Number(NonNaNFloat),
  /// Insertion-ordered option-key → constant mapping.
  Object(IndexMap<Rc<str>, Constant>),
  List(Vec<Constant>),
  Chunk(Rc<Chunk>),
}

impl Constant {
  pub fn string(value: impl AsRef<str>) -> Self {
    Constant::String(Rc::from(value.as_ref()))
  }

  pub fn number(value: f64) -> Self {
    Constant::Number(NonNaNFloat::from(value))
  }

  pub fn as_chunk(&self) -> Option<&Rc<Chunk>> {
    if let Self::Chunk(v) = self {
      Some(v)
    } else {
      None
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Constant::String(_) => "string",
      Constant::Number(_) => "number",
      Constant::Object(_) => "object",
      Constant::List(_) => "list",
      Constant::Chunk(_) => "block",
    }
  }
}

// Scalars, objects and lists compare structurally; chunks are freshly built
// per block and compare by identity. Object equality is order-sensitive to
// stay consistent with `Hash`.
impl PartialEq for Constant {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Constant::String(a), Constant::String(b)) => a == b,
      (Constant::Number(a), Constant::Number(b)) => a == b,
      (Constant::Object(a), Constant::Object(b)) => {
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a == b)
      }
      (Constant::List(a), Constant::List(b)) => a == b,
      (Constant::Chunk(a), Constant::Chunk(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl Eq for Constant {}

impl Hash for Constant {
  fn hash<H: Hasher>(&self, state: &mut H) {
    discriminant(self).hash(state);
    match self {
      Constant::String(v) => v.hash(state),
      Constant::Number(v) => v.hash(state),
      Constant::Object(v) => {
        for (key, value) in v {
          key.hash(state);
          value.hash(state);
        }
      }
      Constant::List(v) => v.hash(state),
      Constant::Chunk(v) => (Rc::as_ptr(v) as usize).hash(state),
    }
  }
}

impl fmt::Display for Constant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Constant::String(v) => write!(f, "\"{v}\""),
      Constant::Number(v) => fmt::Display::fmt(&v.value(), f),
      Constant::Object(v) => {
        f.write_str("{")?;
        for (index, (key, value)) in v.iter().enumerate() {
          if index > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
      }
      Constant::List(v) => {
        f.write_str("[")?;
        for (index, value) in v.iter().enumerate() {
          if index > 0 {
            f.write_str(", ")?;
          }
          fmt::Display::fmt(value, f)?;
        }
        f.write_str("]")
      }
      Constant::Chunk(v) => write!(f, "<block of {}>", v.instructions.len()),
    }
  }
}

/// An `f64` that is known not to be NaN, so it can be hashed and used as a
/// constant-pool dedup key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NonNaNFloat(f64);

impl NonNaNFloat {
  pub fn value(self) -> f64 {
    self.0
  }
}

impl From<f64> for NonNaNFloat {
  fn from(value: f64) -> Self {
    if value.is_nan() {
      panic!("value is NaN")
    }
    Self(value)
  }
}

impl Eq for NonNaNFloat {}

impl Hash for NonNaNFloat {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.0.to_bits().hash(state);
  }
}
