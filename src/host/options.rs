//! Typed vocabularies for the recognized `conf` and `pack` option values.

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {vocabulary} value `{found}`")]
pub struct ParseOptionError {
  vocabulary: &'static str,
  found: String,
}

impl ParseOptionError {
  fn new(vocabulary: &'static str, found: &str) -> Self {
    Self {
      vocabulary,
      found: found.to_owned(),
    }
  }
}

/// `-state normal|disabled|readonly`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidgetState {
  #[default]
  Normal,
  Disabled,
  Readonly,
}

impl FromStr for WidgetState {
  type Err = ParseOptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "normal" => Ok(Self::Normal),
      "disabled" => Ok(Self::Disabled),
      "readonly" => Ok(Self::Readonly),
      _ => Err(ParseOptionError::new("-state", s)),
    }
  }
}

/// `-visible true|false|toggle`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
  Visible,
  Hidden,
  Toggle,
}

impl FromStr for Visibility {
  type Err = ParseOptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "true" => Ok(Self::Visible),
      "false" => Ok(Self::Hidden),
      "toggle" => Ok(Self::Toggle),
      _ => Err(ParseOptionError::new("-visible", s)),
    }
  }
}

/// `-side top|bottom|left|right`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
  Top,
  Bottom,
  Left,
  Right,
}

impl FromStr for Side {
  type Err = ParseOptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "top" => Ok(Self::Top),
      "bottom" => Ok(Self::Bottom),
      "left" => Ok(Self::Left),
      "right" => Ok(Self::Right),
      _ => Err(ParseOptionError::new("-side", s)),
    }
  }
}

/// `-fill x|y|both|none`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
  X,
  Y,
  Both,
  None,
}

impl FromStr for Fill {
  type Err = ParseOptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "x" => Ok(Self::X),
      "y" => Ok(Self::Y),
      "both" => Ok(Self::Both),
      "none" => Ok(Self::None),
      _ => Err(ParseOptionError::new("-fill", s)),
    }
  }
}

/// `-expand yes|no`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expand {
  Yes,
  No,
}

impl FromStr for Expand {
  type Err = ParseOptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "yes" => Ok(Self::Yes),
      "no" => Ok(Self::No),
      _ => Err(ParseOptionError::new("-expand", s)),
    }
  }
}
