use indoc::indoc;

use super::*;
use crate::emit::emit;
use crate::host::{HostError, MemoryHost};
use crate::syntax::parse;
use crate::value::Object;

fn memory_vm() -> Vm {
  Vm::new(Box::new(MemoryHost::new()))
}

fn recording_vm() -> Vm {
  Vm::new(Box::new(RecordingHost::default()))
}

fn run(vm: &mut Vm, src: &str) {
  let chunk = emit(&parse(src).unwrap()).unwrap();
  vm.run(&chunk).unwrap();
}

fn run_err(vm: &mut Vm, src: &str) -> crate::Error {
  let chunk = emit(&parse(src).unwrap()).unwrap();
  vm.run(&chunk).unwrap_err()
}

/// Records every facade call in order; never fails.
#[derive(Debug, Default)]
struct RecordingHost {
  created: Vec<(String, String)>,
  updates: Vec<(String, Object)>,
  packs: Vec<(String, Object)>,
  bound: Vec<(String, Vec<String>)>,
  fetches: Vec<(FetchId, String)>,
}

impl crate::host::Host for RecordingHost {
  fn create_widget(&mut self, name: &str, kind: &str, _options: &Object)
    -> Result<(), HostError> {
    self.created.push((name.to_owned(), kind.to_owned()));
    Ok(())
  }

  fn update_widget(&mut self, name: &str, options: &Object) -> Result<(), HostError> {
    self.updates.push((name.to_owned(), options.clone()));
    Ok(())
  }

  fn pack_widget(&mut self, name: &str, options: &Object) -> Result<(), HostError> {
    self.packs.push((name.to_owned(), options.clone()));
    Ok(())
  }

  fn bind_widget(&mut self, name: &str, events: &[&str]) -> Result<(), HostError> {
    self
      .bound
      .push((name.to_owned(), events.iter().map(|e| e.to_string()).collect()));
    Ok(())
  }

  fn http_get(&mut self, fetch: FetchId, url: &str) -> Result<(), HostError> {
    self.fetches.push((fetch, url.to_owned()));
    Ok(())
  }
}

fn recorded<R>(vm: &Vm, f: impl FnOnce(&RecordingHost) -> R) -> R {
  let host = vm.global().host_ref();
  f((*host).as_any().downcast_ref().unwrap())
}

#[test]
fn set_writes_state() {
  let mut vm = memory_vm();
  run(&mut vm, r#"set my_var "hello""#);
  assert_eq!(vm.state("my_var"), Some(Value::str("hello")));
}

#[test]
fn absent_state_reads_as_null() {
  let mut vm = memory_vm();
  run(&mut vm, "set copy {$missing}");
  assert_eq!(vm.state("copy"), Some(Value::None));
}

#[test]
fn create_widget_reaches_the_host() {
  let mut vm = recording_vm();
  run(&mut vm, r#"b my_button "Click Me""#);
  recorded(&vm, |host| {
    assert_eq!(host.created, vec![("my_button".to_owned(), "BUTTON".to_owned())]);
  });
}

#[test]
fn build_obj_iterates_in_source_order() {
  let mut vm = recording_vm();
  run(&mut vm, r#"conf w -text "a" -bg "b" -fg "c""#);
  recorded(&vm, |host| {
    let (name, options) = &host.updates[0];
    assert_eq!(name, "w");
    let keys = options.keys().map(|k| k.as_ref()).collect::<Vec<_>>();
    assert_eq!(keys, vec!["-text", "-bg", "-fg"]);
  });
}

#[test]
fn build_obj_keeps_the_last_duplicate() {
  let mut vm = recording_vm();
  run(&mut vm, r#"conf w -text "a" -text "b""#);
  recorded(&vm, |host| {
    let (_, options) = &host.updates[0];
    assert_eq!(options.len(), 1);
    assert_eq!(options.get("-text"), Some(&Value::str("b")));
  });
}

#[test]
fn watchers_fire_in_registration_order() {
  let mut vm = recording_vm();
  run(&mut vm, indoc! {r#"
    watch v
      conf first -text "1"
    watch v
      conf second -text "2"
    watch v
      conf third -text "3"
    set v "go"
  "#});
  recorded(&vm, |host| {
    let order = host.updates.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    assert_eq!(order, vec!["first", "second", "third"]);
  });
}

#[test]
fn watcher_cascade_is_synchronous_and_depth_first() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    watch a
      set b {$a}
    watch b
      set c {$b}
    set a "x"
  "#});
  assert_eq!(vm.state("c"), Some(Value::str("x")));
}

#[test]
fn a_failing_watcher_does_not_stop_the_rest() {
  let mut vm = memory_vm();
  let error = run_err(&mut vm, indoc! {r#"
    watch v
      boom 1
    watch v
      set after "ran"
    set v "x"
  "#});
  assert_eq!(error, Error::UndefinedProc("boom".into()).into());
  assert_eq!(vm.state("after"), Some(Value::str("ran")));
}

#[test]
fn proc_params_bind_positionally() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    proc pair a b
      set first {$a}
      set second {$b}
    pair "x" "y"
  "#});
  assert_eq!(vm.state("first"), Some(Value::str("x")));
  assert_eq!(vm.state("second"), Some(Value::str("y")));
}

#[test]
fn proc_params_shadow_state_for_the_call_only() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    set v "outer"
    proc copy v
      set result {$v}
    copy "inner"
    set unshadowed {$v}
  "#});
  assert_eq!(vm.state("result"), Some(Value::str("inner")));
  assert_eq!(vm.state("unshadowed"), Some(Value::str("outer")));
}

#[test]
fn proc_scope_does_not_leak_into_nested_frames() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    watch flag
      set seen {$v}
    proc update v
      set flag {$v}
    update "yes"
  "#});
  assert_eq!(vm.state("flag"), Some(Value::str("yes")));
  // The watcher runs in a fresh frame; `v` is not a state entry.
  assert_eq!(vm.state("seen"), Some(Value::None));
}

#[test]
fn undefined_procedure_is_a_runtime_error() {
  let mut vm = memory_vm();
  let error = run_err(&mut vm, "nope 1");
  assert_eq!(error, Error::UndefinedProc("nope".into()).into());
}

#[test]
fn procedure_arity_mismatch_is_a_runtime_error() {
  let mut vm = memory_vm();
  let error = run_err(&mut vm, indoc! {r#"
    proc p a
      set x {$a}
    p 1 2
  "#});
  assert_eq!(
    error,
    Error::ProcArity {
      name: "p".into(),
      expected: 1,
      found: 2,
    }
    .into()
  );
}

#[test]
fn bound_events_dispatch_their_handlers() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    b my_button "Click Me"
    bind my_button
      .click
        set was_clicked 1
      .hover
        set hovered 1
  "#});

  vm.dispatch_event("my_button", "click").unwrap();
  assert_eq!(vm.state("was_clicked"), Some(Value::str("1")));

  vm.dispatch_event("my_button", "hover").unwrap();
  assert_eq!(vm.state("hovered"), Some(Value::str("1")));

  // Nothing bound: a no-op, not an error.
  vm.dispatch_event("my_button", "blur").unwrap();
  vm.dispatch_event("other", "click").unwrap();
}

#[test]
fn bind_strips_dots_and_keeps_source_order_for_the_host() {
  let mut vm = recording_vm();
  run(&mut vm, indoc! {r#"
    bind w
      .click
        set a 1
      .hover
        set b 1
  "#});
  recorded(&vm, |host| {
    assert_eq!(
      host.bound,
      vec![("w".to_owned(), vec!["click".to_owned(), "hover".to_owned()])]
    );
  });
}

#[test]
fn http_get_success_runs_the_callback() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    http.get "https://example.test/todos"
      .callback
        set done {$http_response}
      .error
        set failed {$error}
  "#});

  let fetch = {
    let host = vm.global().host_ref();
    let host: &MemoryHost = (*host).as_any().downcast_ref().unwrap();
    assert_eq!(host.fetches()[0].1, "https://example.test/todos");
    host.fetches()[0].0
  };

  vm.resolve_fetch(fetch, Ok(Value::str("body"))).unwrap();
  assert_eq!(vm.state("http_response"), Some(Value::str("body")));
  assert_eq!(vm.state("done"), Some(Value::str("body")));
  assert_eq!(vm.state("failed"), None);
}

#[test]
fn http_get_failure_runs_the_error_callback() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    http.get "https://example.test/todos"
      .error
        set failed {$error}
  "#});

  let fetch = fetch_id(&vm);
  vm.resolve_fetch(fetch, Err("connection refused".to_owned()))
    .unwrap();
  assert_eq!(vm.state("error"), Some(Value::str("connection refused")));
  assert_eq!(vm.state("failed"), Some(Value::str("connection refused")));
}

#[test]
fn unrecognized_callbacks_never_fire() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    http.get "https://example.test"
      .done
        set done 1
  "#});

  let fetch = fetch_id(&vm);
  vm.resolve_fetch(fetch, Ok(Value::str("body"))).unwrap();
  // The body still lands in state; `.done` is not a recognized name.
  assert_eq!(vm.state("http_response"), Some(Value::str("body")));
  assert_eq!(vm.state("done"), None);
}

#[test]
fn cancelled_fetches_cannot_resolve() {
  let mut vm = memory_vm();
  run(&mut vm, indoc! {r#"
    http.get "https://example.test"
      .callback
        set done 1
  "#});

  let fetch = fetch_id(&vm);
  vm.cancel_fetch(fetch);
  let error = vm.resolve_fetch(fetch, Ok(Value::None)).unwrap_err();
  assert_eq!(error, Error::UnknownFetch(fetch).into());
  assert_eq!(vm.state("done"), None);
}

fn fetch_id(vm: &Vm) -> FetchId {
  let host = vm.global().host_ref();
  let host: &MemoryHost = (*host).as_any().downcast_ref().unwrap();
  host.fetches()[0].0
}

// The compiler keeps the stack balanced on its own, so `POP` and the
// underflow paths are exercised with hand-assembled chunks.

#[test]
fn pop_discards_the_top_of_stack() {
  use crate::bytecode::{ChunkBuilder, Constant, Instruction};

  let mut builder = ChunkBuilder::new();
  let value = builder.constant(Constant::string("x"));
  builder.emit(Instruction::PushConst(value));
  builder.emit(Instruction::Pop);

  let mut vm = memory_vm();
  vm.run(&builder.finish()).unwrap();
}

#[test]
fn stack_underflow_is_a_runtime_error() {
  use crate::bytecode::{ChunkBuilder, Instruction};

  let mut builder = ChunkBuilder::new();
  builder.emit(Instruction::Pop);

  let mut vm = memory_vm();
  let error = vm.run(&builder.finish()).unwrap_err();
  assert_eq!(error, Error::StackUnderflow.into());
}

#[test]
fn out_of_range_constants_are_a_runtime_error() {
  use crate::bytecode::{ChunkBuilder, Const, Instruction};

  let mut builder = ChunkBuilder::new();
  builder.emit(Instruction::PushConst(Const(7)));
  builder.emit(Instruction::Pop);

  let mut vm = memory_vm();
  let error = vm.run(&builder.finish()).unwrap_err();
  assert_eq!(error, Error::BadConstant(7).into());
}
