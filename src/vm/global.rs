use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt::{self, Debug};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::bytecode::Chunk;
use crate::host::Host;
use crate::value::Value;

/// Shared runtime state: reactive variables, watcher lists, the procedure
/// table, widget event bindings, pending fetches, and the host facade.
///
/// Cheap to clone; all clones share one `State`.
#[derive(Clone)]
pub struct Global {
  inner: Rc<State>,
}

struct State {
  state: RefCell<IndexMap<Rc<str>, Value>>,
  watchers: RefCell<IndexMap<Rc<str>, Vec<Rc<Chunk>>>>,
  procs: RefCell<IndexMap<Rc<str>, Proc>>,
  bindings: RefCell<IndexMap<Rc<str>, IndexMap<Rc<str>, Rc<Chunk>>>>,
  fetches: RefCell<IndexMap<FetchId, Fetch>>,
  next_fetch: Cell<u64>,
  host: RefCell<Box<dyn Host>>,
}

#[derive(Clone)]
pub struct Proc {
  pub params: Vec<Rc<str>>,
  pub chunk: Rc<Chunk>,
}

/// Callbacks of a dispatched `http.get`, keyed by name with the leading dot
/// retained. Unrecognized names stay registered but never fire.
pub(crate) struct Fetch {
  callbacks: IndexMap<Rc<str>, Rc<Chunk>>,
}

impl Fetch {
  pub(crate) fn new(callbacks: IndexMap<Rc<str>, Rc<Chunk>>) -> Self {
    Self { callbacks }
  }

  pub(crate) fn callback(&self, name: &str) -> Option<Rc<Chunk>> {
    self.callbacks.get(name).cloned()
  }
}

/// Identifies one pending fetch across the host boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FetchId(u64);

impl fmt::Display for FetchId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

impl Global {
  pub fn new(host: Box<dyn Host>) -> Self {
    Self {
      inner: Rc::new(State {
        state: RefCell::new(IndexMap::new()),
        watchers: RefCell::new(IndexMap::new()),
        procs: RefCell::new(IndexMap::new()),
        bindings: RefCell::new(IndexMap::new()),
        fetches: RefCell::new(IndexMap::new()),
        next_fetch: Cell::new(0),
        host: RefCell::new(host),
      }),
    }
  }

  pub fn get_state(&self, name: &str) -> Option<Value> {
    self.inner.state.borrow().get(name).cloned()
  }

  /// Raw write; watcher dispatch is the VM's job.
  pub(crate) fn put_state(&self, name: Rc<str>, value: Value) {
    self.inner.state.borrow_mut().insert(name, value);
  }

  /// The watchers registered for `name`, in registration order.
  pub(crate) fn watchers(&self, name: &str) -> Vec<Rc<Chunk>> {
    self
      .inner
      .watchers
      .borrow()
      .get(name)
      .cloned()
      .unwrap_or_default()
  }

  pub(crate) fn watch_state(&self, name: Rc<str>, chunk: Rc<Chunk>) {
    self
      .inner
      .watchers
      .borrow_mut()
      .entry(name)
      .or_insert_with(Vec::new)
      .push(chunk);
  }

  pub(crate) fn define_proc(&self, name: Rc<str>, proc: Proc) {
    self.inner.procs.borrow_mut().insert(name, proc);
  }

  pub(crate) fn get_proc(&self, name: &str) -> Option<Proc> {
    self.inner.procs.borrow().get(name).cloned()
  }

  /// Merge `handlers` into the widget's event map; a later `bind` for the
  /// same event replaces the earlier handler.
  pub(crate) fn bind_widget(&self, name: Rc<str>, handlers: IndexMap<Rc<str>, Rc<Chunk>>) {
    self
      .inner
      .bindings
      .borrow_mut()
      .entry(name)
      .or_insert_with(IndexMap::new)
      .extend(handlers);
  }

  pub(crate) fn handler(&self, widget: &str, event: &str) -> Option<Rc<Chunk>> {
    self.inner.bindings.borrow().get(widget)?.get(event).cloned()
  }

  pub(crate) fn register_fetch(&self, fetch: Fetch) -> FetchId {
    let id = FetchId(self.inner.next_fetch.get());
    self.inner.next_fetch.set(id.0 + 1);
    self.inner.fetches.borrow_mut().insert(id, fetch);
    id
  }

  pub(crate) fn take_fetch(&self, id: FetchId) -> Option<Fetch> {
    self.inner.fetches.borrow_mut().shift_remove(&id)
  }

  pub(crate) fn with_host<R>(&self, f: impl FnOnce(&mut dyn Host) -> R) -> R {
    f(self.inner.host.borrow_mut().as_mut())
  }

  pub fn host_ref(&self) -> Ref<'_, dyn Host> {
    Ref::map(self.inner.host.borrow(), |host| host.as_ref())
  }

  pub fn host_mut(&self) -> RefMut<'_, dyn Host> {
    RefMut::map(self.inner.host.borrow_mut(), |host| host.as_mut())
  }
}

impl Debug for Global {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Global")
      .field("state", &self.inner.state)
      .field("watchers", &self.inner.watchers.borrow().len())
      .field("procs", &self.inner.procs.borrow().len())
      .field("bindings", &self.inner.bindings.borrow().len())
      .field("fetches", &self.inner.fetches.borrow().len())
      .field("host", &"<...>")
      .finish()
  }
}
