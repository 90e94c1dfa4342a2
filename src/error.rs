use crate::host::HostError;
use crate::{emit, syntax, vm};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Syntax(#[from] syntax::Error),
  #[error(transparent)]
  Compile(#[from] emit::Error),
  #[error(transparent)]
  Runtime(#[from] vm::Error),
  #[error(transparent)]
  Host(#[from] HostError),
}
