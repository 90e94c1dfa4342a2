mod memory;
pub mod options;

pub use memory::{Layout, MemoryHost, Widget};

use std::any::Any;

use crate::value::Object;
use crate::vm::FetchId;

/// Failure surfaced from the runtime facade, e.g. a widget not found on
/// update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
  message: String,
}

impl HostError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

pub trait HostBase: 'static {
  fn as_any(&self) -> &dyn Any;
  fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> HostBase for T {
  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

/// The rendering substrate the VM drives. The runtime keeps handler chunks
/// and reactive state itself; the host only learns names, so it can wire its
/// native listeners back through `Vm::dispatch_event` and complete fetches
/// through `Vm::resolve_fetch`.
pub trait Host: HostBase {
  /// Duplicate names may overwrite or fail, at the host's discretion.
  fn create_widget(&mut self, name: &str, kind: &str, options: &Object)
    -> Result<(), HostError>;

  /// Apply each `-option` in `options`; unrecognized options are ignored.
  fn update_widget(&mut self, name: &str, options: &Object) -> Result<(), HostError>;

  /// Apply layout options.
  fn pack_widget(&mut self, name: &str, options: &Object) -> Result<(), HostError>;

  /// Event names arrive with the leading dot already stripped.
  fn bind_widget(&mut self, name: &str, events: &[&str]) -> Result<(), HostError>;

  /// Start an asynchronous fetch. Completion re-enters the VM via
  /// `Vm::resolve_fetch(fetch, …)`.
  fn http_get(&mut self, fetch: FetchId, url: &str) -> Result<(), HostError>;
}
