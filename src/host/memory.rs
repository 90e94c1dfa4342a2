use indexmap::IndexMap;

use super::options::{Expand, Fill, Side, Visibility, WidgetState};
use super::{Host, HostError};
use crate::value::{Object, Value};
use crate::vm::FetchId;

/// A headless host: applies widget and layout option semantics to an
/// in-memory tree and records dispatched fetches, without rendering
/// anything. Embedders without a real substrate and tests both use it.
#[derive(Debug, Default)]
pub struct MemoryHost {
  widgets: IndexMap<String, Widget>,
  fetches: Vec<(FetchId, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
  pub kind: String,
  /// Style and content properties, e.g. `text`, `backgroundColor`.
  pub props: IndexMap<String, Value>,
  pub layout: Layout,
  pub state: WidgetState,
  pub visible: bool,
  /// Events bound through `bind`, dots stripped.
  pub events: Vec<String>,
}

impl Widget {
  fn new(kind: &str, options: &Object) -> Self {
    Self {
      kind: kind.to_owned(),
      props: options
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect(),
      layout: Layout::default(),
      state: WidgetState::default(),
      visible: true,
      events: Vec::new(),
    }
  }

  pub fn prop(&self, name: &str) -> Option<&Value> {
    self.props.get(name)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
  pub side: Option<Side>,
  pub anchor: Option<String>,
  pub fill: Option<Fill>,
  pub expand: Option<Expand>,
  pub padx: Option<Value>,
  pub pady: Option<Value>,
  pub ipadx: Option<Value>,
  pub ipady: Option<Value>,
}

impl MemoryHost {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn widget(&self, name: &str) -> Option<&Widget> {
    self.widgets.get(name)
  }

  pub fn widgets(&self) -> impl Iterator<Item = (&str, &Widget)> {
    self.widgets.iter().map(|(name, widget)| (name.as_str(), widget))
  }

  /// Fetches dispatched through `http.get`, oldest first. Completing one is
  /// the embedder's job via `Vm::resolve_fetch`.
  pub fn fetches(&self) -> &[(FetchId, String)] {
    &self.fetches
  }

  fn widget_mut(&mut self, name: &str) -> Result<&mut Widget, HostError> {
    self
      .widgets
      .get_mut(name)
      .ok_or_else(|| HostError::new(format!("unknown widget `{name}`")))
  }
}

impl Host for MemoryHost {
  fn create_widget(&mut self, name: &str, kind: &str, options: &Object)
    -> Result<(), HostError> {
    // Duplicate names overwrite.
    self.widgets.insert(name.to_owned(), Widget::new(kind, options));
    Ok(())
  }

  fn update_widget(&mut self, name: &str, options: &Object) -> Result<(), HostError> {
    let widget = self.widget_mut(name)?;
    for (key, value) in options {
      let prop = match key.as_ref() {
        "-text" => "text",
        "-bg" => "backgroundColor",
        "-fg" => "color",
        "-font" => "font",
        "-width" => "width",
        "-height" => "height",
        "-items" => "items",
        "-value" => "value",
        "-state" => {
          widget.state = parse(key, value)?;
          continue;
        }
        "-visible" => {
          widget.visible = match parse(key, value)? {
            Visibility::Visible => true,
            Visibility::Hidden => false,
            Visibility::Toggle => !widget.visible,
          };
          continue;
        }
        // Unrecognized options are silently ignored.
        _ => continue,
      };
      widget.props.insert(prop.to_owned(), value.clone());
    }
    Ok(())
  }

  fn pack_widget(&mut self, name: &str, options: &Object) -> Result<(), HostError> {
    let widget = self.widget_mut(name)?;
    for (key, value) in options {
      match key.as_ref() {
        "-side" => widget.layout.side = Some(parse(key, value)?),
        "-anchor" => widget.layout.anchor = Some(text(key, value)?.to_owned()),
        "-fill" => widget.layout.fill = Some(parse(key, value)?),
        "-expand" => widget.layout.expand = Some(parse(key, value)?),
        "-padx" => widget.layout.padx = Some(value.clone()),
        "-pady" => widget.layout.pady = Some(value.clone()),
        "-ipadx" => widget.layout.ipadx = Some(value.clone()),
        "-ipady" => widget.layout.ipady = Some(value.clone()),
        _ => {}
      }
    }
    Ok(())
  }

  fn bind_widget(&mut self, name: &str, events: &[&str]) -> Result<(), HostError> {
    let widget = self.widget_mut(name)?;
    for &event in events {
      if !widget.events.iter().any(|bound| bound == event) {
        widget.events.push(event.to_owned());
      }
    }
    Ok(())
  }

  fn http_get(&mut self, fetch: FetchId, url: &str) -> Result<(), HostError> {
    self.fetches.push((fetch, url.to_owned()));
    Ok(())
  }
}

fn text<'a>(option: &str, value: &'a Value) -> Result<&'a str, HostError> {
  value
    .as_str()
    .ok_or_else(|| HostError::new(format!("`{option}` expects a string, found {}", value.kind())))
}

fn parse<T>(option: &str, value: &Value) -> Result<T, HostError>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  text(option, value)?
    .parse()
    .map_err(|error: T::Err| HostError::new(error.to_string()))
}
