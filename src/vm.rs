mod dispatch;
mod global;

pub use global::{FetchId, Global, Proc};

use std::rc::Rc;

use crate::bytecode::Chunk;
use crate::error::Result;
use crate::host::Host;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error("operand stack underflow")]
  StackUnderflow,
  #[error("undefined procedure `{0}`")]
  UndefinedProc(String),
  #[error("`{name}` takes {expected} argument(s), found {found}")]
  ProcArity {
    name: String,
    expected: usize,
    found: usize,
  },
  #[error("constant index {0} out of bounds")]
  BadConstant(u32),
  #[error("expected a {expected}, found {found}")]
  Mismatch {
    expected: &'static str,
    found: &'static str,
  },
  #[error("no pending fetch with id {0}")]
  UnknownFetch(FetchId),
}

/// Executes chunks against the shared runtime state. `run` is re-entrant
/// (watchers, event handlers, procedures and fetch callbacks each execute in
/// a fresh frame with its own operand stack) but not thread-safe.
pub struct Vm {
  global: Global,
}

impl Vm {
  pub fn new(host: Box<dyn Host>) -> Self {
    Self {
      global: Global::new(host),
    }
  }

  pub fn global(&self) -> &Global {
    &self.global
  }

  /// Execute a top-level chunk to completion.
  pub fn run(&mut self, chunk: &Chunk) -> Result<()> {
    self.run_frame(chunk, None)
  }

  pub fn state(&self, name: &str) -> Option<Value> {
    self.global.get_state(name)
  }

  /// Write a state entry and synchronously fire its watchers in
  /// registration order.
  pub fn set_state(&mut self, name: &str, value: Value) -> Result<()> {
    self.store(Rc::from(name), value)
  }

  /// Run the handler bound for `event` on `widget`, if any. Event names
  /// carry no leading dot here.
  pub fn dispatch_event(&mut self, widget: &str, event: &str) -> Result<()> {
    match self.global.handler(widget, event) {
      Some(chunk) => self.run_frame(&chunk, None),
      None => Ok(()),
    }
  }

  /// Complete a pending fetch: on success `state.http_response` receives the
  /// body and the `.callback` chunk runs; on failure `state.error` receives
  /// the message and the `.error` chunk runs.
  pub fn resolve_fetch(&mut self, fetch: FetchId, response: Result<Value, String>) -> Result<()> {
    let Some(pending) = self.global.take_fetch(fetch) else {
      return Err(Error::UnknownFetch(fetch).into());
    };
    let (name, callback, value) = match response {
      Ok(body) => ("http_response", pending.callback(".callback"), body),
      Err(message) => ("error", pending.callback(".error"), Value::str(message)),
    };
    self.store(Rc::from(name), value)?;
    match callback {
      Some(chunk) => self.run_frame(&chunk, None),
      None => Ok(()),
    }
  }

  /// Drop a pending fetch; its callbacks will never fire.
  pub fn cancel_fetch(&mut self, fetch: FetchId) {
    self.global.take_fetch(fetch);
  }
}

#[cfg(test)]
mod tests;
