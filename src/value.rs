use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::bytecode::{Chunk, Constant};

/// Insertion-ordered key → value mapping.
pub type Object = IndexMap<Rc<str>, Value>;

/// A value on the operand stack or in the runtime state.
#[derive(Clone, Debug, Default)]
pub enum Value {
  #[default]
  None,
  Bool(bool),
  Num(f64),
  Str(Rc<str>),
  List(Rc<Vec<Value>>),
  Object(Rc<Object>),
  Chunk(Rc<Chunk>),
}

impl Value {
  pub fn str(value: impl AsRef<str>) -> Self {
    Value::Str(Rc::from(value.as_ref()))
  }

  pub fn list(values: Vec<Value>) -> Self {
    Value::List(Rc::new(values))
  }

  pub fn object(object: Object) -> Self {
    Value::Object(Rc::new(object))
  }

  pub fn is_none(&self) -> bool {
    matches!(self, Value::None)
  }

  pub fn as_str(&self) -> Option<&str> {
    if let Value::Str(v) = self {
      Some(v)
    } else {
      None
    }
  }

  pub fn as_num(&self) -> Option<f64> {
    if let Value::Num(v) = self {
      Some(*v)
    } else {
      None
    }
  }

  pub fn as_object(&self) -> Option<&Object> {
    if let Value::Object(v) = self {
      Some(v)
    } else {
      None
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Value::None => "null",
      Value::Bool(_) => "bool",
      Value::Num(_) => "number",
      Value::Str(_) => "string",
      Value::List(_) => "list",
      Value::Object(_) => "object",
      Value::Chunk(_) => "block",
    }
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::None, Value::None) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Num(a), Value::Num(b)) => a == b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::List(a), Value::List(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a == b,
      (Value::Chunk(a), Value::Chunk(b)) => Rc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl From<&Constant> for Value {
  fn from(constant: &Constant) -> Self {
    match constant {
      Constant::String(v) => Value::Str(v.clone()),
      Constant::Number(v) => Value::Num(v.value()),
      Constant::Object(v) => Value::Object(Rc::new(
        v.iter().map(|(k, c)| (k.clone(), Value::from(c))).collect(),
      )),
      Constant::List(v) => Value::List(Rc::new(v.iter().map(Value::from).collect())),
      Constant::Chunk(v) => Value::Chunk(v.clone()),
    }
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::str(value)
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::Str(Rc::from(value))
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Num(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::None => f.write_str("null"),
      Value::Bool(v) => fmt::Display::fmt(v, f),
      Value::Num(v) => fmt::Display::fmt(v, f),
      Value::Str(v) => f.write_str(v),
      Value::List(v) => {
        f.write_str("[")?;
        for (index, value) in v.iter().enumerate() {
          if index > 0 {
            f.write_str(", ")?;
          }
          fmt::Display::fmt(value, f)?;
        }
        f.write_str("]")
      }
      Value::Object(v) => {
        f.write_str("{")?;
        for (index, (key, value)) in v.iter().enumerate() {
          if index > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
      }
      Value::Chunk(_) => f.write_str("<block>"),
    }
  }
}
