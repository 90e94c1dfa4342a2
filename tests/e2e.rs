use indoc::indoc;
use tela::host::options::{Expand, Fill, Side};
use tela::{Error, MemoryHost, Tela, Value};

#[test]
fn conf_updates_widget_properties() {
  let mut app = Tela::default();
  app
    .run(indoc! {r#"
      l my_label "Initial"
      conf my_label -text "Updated" -bg "blue"
    "#})
    .unwrap();

  let host = app.host::<MemoryHost>().unwrap();
  let widget = host.widget("my_label").unwrap();
  assert_eq!(widget.prop("text"), Some(&Value::str("Updated")));
  assert_eq!(widget.prop("backgroundColor"), Some(&Value::str("blue")));
}

#[test]
fn click_handler_mutates_state() {
  let mut app = Tela::default();
  app
    .run(indoc! {r#"
      b my_button "Click Me"
      bind my_button
        .click
          set was_clicked 1
    "#})
    .unwrap();

  assert_eq!(app.state("was_clicked"), None);
  app.dispatch_event("my_button", "click").unwrap();
  assert_eq!(app.state("was_clicked"), Some(Value::str("1")));
}

#[test]
fn watcher_drives_widget_updates() {
  let mut app = Tela::default();
  app
    .run(indoc! {r#"
      l my_label "Initial"
      watch my_var
        conf my_label -text {$my_var}
    "#})
    .unwrap();

  app.set_state("my_var", Value::str("X")).unwrap();

  let host = app.host::<MemoryHost>().unwrap();
  let widget = host.widget("my_label").unwrap();
  assert_eq!(widget.prop("text"), Some(&Value::str("X")));
}

#[test]
fn pack_lays_widgets_out() {
  let mut app = Tela::default();
  app
    .run(indoc! {r#"
      c root
      i new_todo ""
      b add "Add"
      pack new_todo -side top -fill x
      pack add -side bottom -expand yes
    "#})
    .unwrap();

  let host = app.host::<MemoryHost>().unwrap();
  let input = host.widget("new_todo").unwrap();
  assert_eq!(input.kind, "INPUT");
  assert_eq!(input.layout.side, Some(Side::Top));
  assert_eq!(input.layout.fill, Some(Fill::X));
  let button = host.widget("add").unwrap();
  assert_eq!(button.layout.side, Some(Side::Bottom));
  assert_eq!(button.layout.expand, Some(Expand::Yes));
}

#[test]
fn procs_compose_with_events_and_watchers() {
  let mut app = Tela::default();
  app
    .run(indoc! {r#"
      l greeting_label ""
      watch greeting
        conf greeting_label -text {$greeting}
      proc greet name
        set greeting {$name}
      b hello "Say Hello"
      bind hello
        .click
          greet "Hello World"
    "#})
    .unwrap();

  app.dispatch_event("hello", "click").unwrap();
  assert_eq!(app.state("greeting"), Some(Value::str("Hello World")));
  let host = app.host::<MemoryHost>().unwrap();
  assert_eq!(
    host.widget("greeting_label").unwrap().prop("text"),
    Some(&Value::str("Hello World"))
  );
}

#[test]
fn fetch_completion_reenters_the_vm() {
  let mut app = Tela::default();
  app
    .run(indoc! {r#"
      l status ""
      watch http_response
        conf status -text {$http_response}
      http.get "https://example.test/todos"
        .callback
          set loaded "yes"
        .error
          set loaded "no"
    "#})
    .unwrap();

  let fetch = {
    let host = app.host::<MemoryHost>().unwrap();
    assert_eq!(host.fetches()[0].1, "https://example.test/todos");
    host.fetches()[0].0
  };

  app.resolve_fetch(fetch, Ok(Value::str("[]"))).unwrap();
  assert_eq!(app.state("loaded"), Some(Value::str("yes")));

  let host = app.host::<MemoryHost>().unwrap();
  assert_eq!(
    host.widget("status").unwrap().prop("text"),
    Some(&Value::str("[]"))
  );
}

#[test]
fn parse_errors_surface_with_context() {
  let mut app = Tela::default();
  let error = app.run("  l a").unwrap_err();
  assert!(matches!(error, Error::Syntax(_)));
  assert!(error.to_string().contains("cannot indent on an empty block"));

  let error = app.run("l a\n   b").unwrap_err();
  assert!(error.to_string().contains("invalid indentation"));
}

#[test]
fn compile_errors_name_the_command() {
  let mut app = Tela::default();
  let error = app.run("watch v").unwrap_err();
  assert!(matches!(error, Error::Compile(_)));
  assert!(error.to_string().contains("`watch`"));
}

#[test]
fn runtime_errors_unwind_to_the_run_boundary() {
  let mut app = Tela::default();
  let error = app.run("definitely_not_defined 1 2 3").unwrap_err();
  assert!(matches!(error, Error::Runtime(_)));
  assert!(error.to_string().contains("definitely_not_defined"));
}

#[test]
fn host_errors_unwind_to_the_run_boundary() {
  let mut app = Tela::default();
  let error = app.run(r#"conf ghost -text "boo""#).unwrap_err();
  assert!(matches!(error, Error::Host(_)));
  assert!(error.to_string().contains("ghost"));
}

#[test]
fn pretty_print_round_trips_through_the_parser() {
  let src = indoc! {r#"
    # comments vanish in the round trip
    set todos ""
    i new_todo ""
    bind new_todo
      .submit
        lappend todos {$new_todo}
  "#};

  let first = tela::parse(src).unwrap();
  let printed = first.to_string();
  let reparsed = tela::parse(&printed).unwrap();
  assert_eq!(printed, reparsed.to_string());
  assert!(!printed.contains('#'));
}

#[test]
fn compiled_chunks_can_run_repeatedly() {
  let chunk = tela::compile(r#"set runs "again""#).unwrap();
  let mut app = Tela::default();
  app.run_chunk(&chunk).unwrap();
  assert_eq!(app.state("runs"), Some(Value::str("again")));

  let mut other = Tela::builder().with_host(MemoryHost::new()).build();
  other.run_chunk(&chunk).unwrap();
  assert_eq!(other.state("runs"), Some(Value::str("again")));
}
