use std::rc::Rc;

use indexmap::IndexMap;

use crate::bytecode::{Chunk, ChunkBuilder, Const, Constant, Instruction};
use crate::syntax::ast::{Argument, Command, Program};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Compile a program into an executable chunk. Blocks compile recursively
/// into nested chunks with isolated constant pools.
pub fn emit(program: &Program<'_>) -> Result<Chunk> {
  Emitter::new().program(&program.body)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error("`{command}` expects {expected} argument(s), found {found}")]
  Arity {
    command: String,
    expected: &'static str,
    found: usize,
  },
  #[error("`{command}` expects an indented block")]
  MissingBlock { command: String },
  #[error("`{command}` does not take an indented block")]
  UnexpectedBlock { command: String },
  #[error("`{command}` expects `-option value` pairs after the widget name")]
  DanglingOption { command: String },
  #[error("`{command}` option keys cannot be substitutions")]
  SubstitutionKey { command: String },
  #[error("children of `{command}` must be `.event` handlers, found `{found}`")]
  ExpectedEvent { command: String, found: String },
}

struct Emitter {
  chunk: ChunkBuilder,
}

impl Emitter {
  fn new() -> Self {
    Self {
      chunk: ChunkBuilder::new(),
    }
  }

  fn program(mut self, body: &[Command<'_>]) -> Result<Chunk> {
    for command in body {
      self.command(command)?;
    }
    Ok(self.chunk.finish())
  }

  /// Dispatch on the command name. Anything unrecognized becomes a
  /// procedure call.
  fn command(&mut self, command: &Command<'_>) -> Result<()> {
    match command.name.as_ref() {
      "set" => self.set(command),
      "l" | "label" => self.widget(command, WidgetKind::Label),
      "b" | "button" => self.widget(command, WidgetKind::Button),
      "i" | "input" => self.widget(command, WidgetKind::Input),
      "listbox" => self.widget(command, WidgetKind::Listbox),
      "canvas" => self.widget(command, WidgetKind::Canvas),
      "c" | "container" => self.widget(command, WidgetKind::Container),
      "conf" | "config" => self.configure(command, Instruction::UpdateWidget),
      "pack" => self.configure(command, Instruction::PackWidget),
      "bind" => self.bind(command),
      "watch" => self.watch(command),
      "proc" => self.proc(command),
      "http.get" => self.http_get(command),
      _ => self.call(command),
    }
  }

  /// Every argument compiles to a single push; substitution is deferred to
  /// execution time.
  fn argument(&mut self, argument: &Argument<'_>) {
    match argument {
      Argument::Ident(v) | Argument::Str(v) | Argument::Opt(v) => {
        let index = self.chunk.constant(Constant::string(&**v));
        self.chunk.emit(Instruction::PushConst(index));
      }
      Argument::Var(name) => {
        let index = self.chunk.constant(Constant::string(&**name));
        self.chunk.emit(Instruction::PushVar(index));
      }
    }
  }

  /// Compile `body` with a fresh emitter and pool the resulting chunk.
  fn block(&mut self, body: &[Command<'_>]) -> Result<Const> {
    let chunk = Emitter::new().program(body)?;
    Ok(self.chunk.constant(Constant::Chunk(Rc::new(chunk))))
  }

  fn leaf(&self, command: &Command<'_>) -> Result<()> {
    if command.body.is_some() {
      return Err(Error::UnexpectedBlock {
        command: command.name.to_string(),
      });
    }
    Ok(())
  }

  fn body_of<'a, 'src>(&self, command: &'a Command<'src>) -> Result<&'a [Command<'src>]> {
    match &command.body {
      Some(body) => Ok(body),
      None => Err(Error::MissingBlock {
        command: command.name.to_string(),
      }),
    }
  }

  fn set(&mut self, command: &Command<'_>) -> Result<()> {
    self.leaf(command)?;
    let [name, value] = command.args.as_slice() else {
      return Err(Error::Arity {
        command: command.name.to_string(),
        expected: "exactly 2",
        found: command.args.len(),
      });
    };
    self.argument(value);
    self.argument(name);
    self.chunk.emit(Instruction::SetState);
    Ok(())
  }

  fn widget(&mut self, command: &Command<'_>, kind: WidgetKind) -> Result<()> {
    self.leaf(command)?;
    let Some((name, rest)) = command.args.split_first() else {
      return Err(Error::Arity {
        command: command.name.to_string(),
        expected: "at least 1",
        found: 0,
      });
    };
    let options = self.chunk.constant(kind.options(rest));
    self.chunk.emit(Instruction::PushConst(options));
    let tag = self.chunk.constant(Constant::string(kind.tag()));
    self.chunk.emit(Instruction::PushConst(tag));
    self.argument(name);
    self.chunk.emit(Instruction::CreateWidget);
    Ok(())
  }

  /// `conf`/`config` and `pack`: build the option object from the pairs
  /// after the widget name, then apply it.
  fn configure(&mut self, command: &Command<'_>, op: Instruction) -> Result<()> {
    self.leaf(command)?;
    let Some((name, pairs)) = command.args.split_first() else {
      return Err(Error::Arity {
        command: command.name.to_string(),
        expected: "at least 1",
        found: 0,
      });
    };
    if pairs.len() % 2 != 0 {
      return Err(Error::DanglingOption {
        command: command.name.to_string(),
      });
    }
    for pair in pairs.chunks_exact(2) {
      let Some(key) = literal(&pair[0]) else {
        return Err(Error::SubstitutionKey {
          command: command.name.to_string(),
        });
      };
      self.argument(&pair[1]);
      let key = self.chunk.constant(Constant::string(key));
      self.chunk.emit(Instruction::PushConst(key));
    }
    self.chunk.emit(Instruction::BuildObj((pairs.len() / 2) as u32));
    self.argument(name);
    self.chunk.emit(op);
    Ok(())
  }

  fn bind(&mut self, command: &Command<'_>) -> Result<()> {
    let [name] = command.args.as_slice() else {
      return Err(Error::Arity {
        command: command.name.to_string(),
        expected: "exactly 1",
        found: command.args.len(),
      });
    };
    let events = self.body_of(command)?;
    for event in events {
      self.event(command, event)?;
    }
    self.argument(name);
    self.chunk.emit(Instruction::BindWidget(events.len() as u32));
    Ok(())
  }

  /// One `.event` child of `bind` or `http.get`: its body becomes a chunk,
  /// followed by the event name (dot included).
  fn event(&mut self, parent: &Command<'_>, child: &Command<'_>) -> Result<()> {
    if !child.name.starts_with('.') {
      return Err(Error::ExpectedEvent {
        command: parent.name.to_string(),
        found: child.name.to_string(),
      });
    }
    if !child.args.is_empty() {
      return Err(Error::Arity {
        command: child.name.to_string(),
        expected: "exactly 0",
        found: child.args.len(),
      });
    }
    let body = self.body_of(child)?;
    let block = self.block(body)?;
    self.chunk.emit(Instruction::DefBlock(block));
    let name = self.chunk.constant(Constant::string(&*child.name));
    self.chunk.emit(Instruction::PushConst(name));
    Ok(())
  }

  fn watch(&mut self, command: &Command<'_>) -> Result<()> {
    let [name] = command.args.as_slice() else {
      return Err(Error::Arity {
        command: command.name.to_string(),
        expected: "exactly 1",
        found: command.args.len(),
      });
    };
    let body = self.body_of(command)?;
    let block = self.block(body)?;
    self.chunk.emit(Instruction::DefBlock(block));
    self.argument(name);
    self.chunk.emit(Instruction::WatchState);
    Ok(())
  }

  fn proc(&mut self, command: &Command<'_>) -> Result<()> {
    let Some((name, params)) = command.args.split_first() else {
      return Err(Error::Arity {
        command: command.name.to_string(),
        expected: "at least 1",
        found: 0,
      });
    };
    let body = self.body_of(command)?;
    let block = self.block(body)?;
    self.chunk.emit(Instruction::DefBlock(block));
    for param in params {
      self.argument(param);
    }
    self.argument(name);
    self.chunk.emit(Instruction::DefProc(params.len() as u32));
    Ok(())
  }

  fn http_get(&mut self, command: &Command<'_>) -> Result<()> {
    let [url] = command.args.as_slice() else {
      return Err(Error::Arity {
        command: command.name.to_string(),
        expected: "exactly 1",
        found: command.args.len(),
      });
    };
    let callbacks = self.body_of(command)?;
    for callback in callbacks {
      self.event(command, callback)?;
    }
    self.argument(url);
    self.chunk.emit(Instruction::HttpGet(callbacks.len() as u32));
    Ok(())
  }

  fn call(&mut self, command: &Command<'_>) -> Result<()> {
    self.leaf(command)?;
    for argument in &command.args {
      self.argument(argument);
    }
    let name = self.chunk.constant(Constant::string(&*command.name));
    self.chunk.emit(Instruction::PushConst(name));
    self.chunk.emit(Instruction::CallProc(command.args.len() as u32));
    Ok(())
  }
}

#[derive(Clone, Copy)]
enum WidgetKind {
  Label,
  Button,
  Input,
  Listbox,
  Canvas,
  Container,
}

impl WidgetKind {
  fn tag(self) -> &'static str {
    match self {
      WidgetKind::Label => "LABEL",
      WidgetKind::Button => "BUTTON",
      WidgetKind::Input => "INPUT",
      WidgetKind::Listbox => "LISTBOX",
      WidgetKind::Canvas => "CANVAS",
      WidgetKind::Container => "CONTAINER",
    }
  }

  /// The static option object a constructor assembles from its positional
  /// arguments. Substitutions are not static and do not participate.
  fn options(self, args: &[Argument<'_>]) -> Constant {
    let mut object: IndexMap<Rc<str>, Constant> = IndexMap::new();
    match self {
      WidgetKind::Label | WidgetKind::Button => {
        if let Some(text) = args.first().and_then(literal) {
          object.insert(Rc::from("label"), Constant::string(text));
        }
      }
      WidgetKind::Input => {
        if let Some(text) = args.first().and_then(literal) {
          object.insert(Rc::from("initialText"), Constant::string(text));
        }
      }
      WidgetKind::Canvas => {
        if let Some(width) = args.first().and_then(literal) {
          object.insert(Rc::from("width"), dimension(width));
        }
        if let Some(height) = args.get(1).and_then(literal) {
          object.insert(Rc::from("height"), dimension(height));
        }
      }
      WidgetKind::Listbox | WidgetKind::Container => {}
    }
    Constant::Object(object)
  }
}

/// The lexical text of a literal argument; substitutions have none.
fn literal<'a>(argument: &'a Argument<'_>) -> Option<&'a str> {
  match argument {
    Argument::Ident(v) | Argument::Str(v) | Argument::Opt(v) => Some(v),
    Argument::Var(_) => None,
  }
}

fn dimension(text: &str) -> Constant {
  match text.parse::<f64>() {
    Ok(value) if !value.is_nan() => Constant::number(value),
    _ => Constant::string(text),
  }
}
