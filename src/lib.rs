pub mod bytecode;
pub mod emit;
mod error;
pub mod host;
pub mod syntax;
mod value;
pub mod vm;

use std::cell::{Ref, RefMut};

pub use bytecode::{Chunk, Constant, Instruction};
pub use emit::emit;
pub use error::{Error, Result};
pub use host::{Host, HostError, MemoryHost};
pub use syntax::parse;
pub use value::{Object, Value};
pub use vm::{FetchId, Vm};

/// Parse and compile `src` into an executable chunk.
pub fn compile(src: &str) -> Result<Chunk> {
  let program = syntax::parse(src)?;
  Ok(emit::emit(&program)?)
}

/// The embedder facade: a VM wired to a host, driven with source text and
/// re-entered through events and fetch completions.
pub struct Tela {
  vm: Vm,
}

impl Tela {
  pub fn builder() -> TelaBuilder {
    TelaBuilder { host: None }
  }

  /// Parse, compile and execute `src` as a top-level chunk.
  pub fn run(&mut self, src: &str) -> Result<()> {
    let chunk = compile(src)?;
    self.vm.run(&chunk)
  }

  pub fn run_chunk(&mut self, chunk: &Chunk) -> Result<()> {
    self.vm.run(chunk)
  }

  pub fn state(&self, name: &str) -> Option<Value> {
    self.vm.state(name)
  }

  /// Write a state entry and fire its watchers, as `set` would.
  pub fn set_state(&mut self, name: &str, value: Value) -> Result<()> {
    self.vm.set_state(name, value)
  }

  /// Deliver a host event, e.g. a button click. No-op when nothing is bound.
  pub fn dispatch_event(&mut self, widget: &str, event: &str) -> Result<()> {
    self.vm.dispatch_event(widget, event)
  }

  /// Complete a pending `http.get`.
  pub fn resolve_fetch(&mut self, fetch: FetchId, response: Result<Value, String>) -> Result<()> {
    self.vm.resolve_fetch(fetch, response)
  }

  pub fn cancel_fetch(&mut self, fetch: FetchId) {
    self.vm.cancel_fetch(fetch)
  }

  /// Borrow the host as its concrete type.
  pub fn host<T: 'static>(&self) -> Option<Ref<'_, T>> {
    Ref::filter_map(self.vm.global().host_ref(), |host| {
      host.as_any().downcast_ref()
    })
    .ok()
  }

  pub fn host_mut<T: 'static>(&mut self) -> Option<RefMut<'_, T>> {
    RefMut::filter_map(self.vm.global().host_mut(), |host| {
      host.as_any_mut().downcast_mut()
    })
    .ok()
  }
}

impl Default for Tela {
  fn default() -> Self {
    Self::builder().build()
  }
}

pub struct TelaBuilder {
  host: Option<Box<dyn Host>>,
}

impl TelaBuilder {
  /// Replace the default in-memory host.
  pub fn with_host<T: Host>(mut self, host: T) -> Self {
    let _ = self.host.replace(Box::new(host));
    self
  }

  pub fn build(mut self) -> Tela {
    let host = self
      .host
      .take()
      .unwrap_or_else(|| Box::new(MemoryHost::new()));
    Tela { vm: Vm::new(host) }
  }
}
