use std::rc::Rc;

use indexmap::IndexMap;

use super::global::{Fetch, Proc};
use super::{Error, Vm};
use crate::bytecode::{Chunk, Const, Constant, Instruction};
use crate::error::Result;
use crate::value::{Object, Value};

/// Procedure-call parameter bindings; they shadow state entries for the
/// duration of the call and do not leak into nested frames.
type Scope = IndexMap<Rc<str>, Value>;

impl Vm {
  /// The fetch-decode-execute loop. Every invocation owns its operand
  /// stack; nested chunks run in fresh frames.
  pub(crate) fn run_frame(&mut self, chunk: &Chunk, scope: Option<&Scope>) -> Result<()> {
    let mut stack: Vec<Value> = Vec::new();
    let mut ip = 0;
    while let Some(&instruction) = chunk.instructions.get(ip) {
      ip += 1;
      match instruction {
        Instruction::PushConst(index) => {
          stack.push(Value::from(constant(chunk, index)?));
        }
        Instruction::PushVar(index) => {
          let name = constant_str(chunk, index)?;
          let value = scope
            .and_then(|scope| scope.get(name).cloned())
            .or_else(|| self.global.get_state(name))
            .unwrap_or(Value::None);
          stack.push(value);
        }
        Instruction::Pop => {
          pop(&mut stack)?;
        }
        Instruction::SetState => {
          let name = pop_str(&mut stack)?;
          let value = pop(&mut stack)?;
          self.store(name, value)?;
        }
        Instruction::BuildObj(len) => {
          let mut pairs = Vec::with_capacity(len as usize);
          for _ in 0..len {
            let key = pop_str(&mut stack)?;
            let value = pop(&mut stack)?;
            pairs.push((key, value));
          }
          // Popping yields pairs in reverse source order; rebuild so the
          // object iterates in source order.
          let object: Object = pairs.into_iter().rev().collect();
          stack.push(Value::object(object));
        }
        Instruction::CreateWidget => {
          let name = pop_str(&mut stack)?;
          let kind = pop_str(&mut stack)?;
          let options = pop_object(&mut stack)?;
          self
            .global
            .with_host(|host| host.create_widget(&name, &kind, &options))?;
        }
        Instruction::UpdateWidget => {
          let name = pop_str(&mut stack)?;
          let options = pop_object(&mut stack)?;
          self
            .global
            .with_host(|host| host.update_widget(&name, &options))?;
        }
        Instruction::PackWidget => {
          let name = pop_str(&mut stack)?;
          let options = pop_object(&mut stack)?;
          self
            .global
            .with_host(|host| host.pack_widget(&name, &options))?;
        }
        Instruction::DefBlock(index) => {
          let block = match constant(chunk, index)? {
            Constant::Chunk(block) => block.clone(),
            other => {
              return Err(
                Error::Mismatch {
                  expected: "block",
                  found: other.kind(),
                }
                .into(),
              )
            }
          };
          stack.push(Value::Chunk(block));
        }
        Instruction::BindWidget(len) => {
          let name = pop_str(&mut stack)?;
          let mut handlers = Vec::with_capacity(len as usize);
          for _ in 0..len {
            let event = pop_str(&mut stack)?;
            let handler = pop_chunk(&mut stack)?;
            handlers.push((event, handler));
          }
          // Reverse back into source order and strip the leading dot
          // before registering.
          let mut map: IndexMap<Rc<str>, Rc<Chunk>> = IndexMap::with_capacity(handlers.len());
          for (event, handler) in handlers.into_iter().rev() {
            let event: Rc<str> = Rc::from(event.strip_prefix('.').unwrap_or(&event));
            map.insert(event, handler);
          }
          let events: Vec<&str> = map.keys().map(|k| k.as_ref()).collect();
          self
            .global
            .with_host(|host| host.bind_widget(&name, &events))?;
          self.global.bind_widget(name, map);
        }
        Instruction::WatchState => {
          let name = pop_str(&mut stack)?;
          let watcher = pop_chunk(&mut stack)?;
          self.global.watch_state(name, watcher);
        }
        Instruction::DefProc(len) => {
          let name = pop_str(&mut stack)?;
          let mut params = Vec::with_capacity(len as usize);
          for _ in 0..len {
            params.push(pop_str(&mut stack)?);
          }
          params.reverse();
          let body = pop_chunk(&mut stack)?;
          self.global.define_proc(name, Proc { params, chunk: body });
        }
        Instruction::CallProc(len) => {
          let name = pop_str(&mut stack)?;
          let mut args = Vec::with_capacity(len as usize);
          for _ in 0..len {
            args.push(pop(&mut stack)?);
          }
          args.reverse();
          let proc = self
            .global
            .get_proc(&name)
            .ok_or_else(|| Error::UndefinedProc(name.to_string()))?;
          if proc.params.len() != args.len() {
            return Err(
              Error::ProcArity {
                name: name.to_string(),
                expected: proc.params.len(),
                found: args.len(),
              }
              .into(),
            );
          }
          let scope: Scope = proc.params.iter().cloned().zip(args).collect();
          self.run_frame(&proc.chunk, Some(&scope))?;
        }
        Instruction::HttpGet(len) => {
          let url = pop_str(&mut stack)?;
          let mut callbacks = Vec::with_capacity(len as usize);
          for _ in 0..len {
            let name = pop_str(&mut stack)?;
            let callback = pop_chunk(&mut stack)?;
            callbacks.push((name, callback));
          }
          let fetch = Fetch::new(callbacks.into_iter().rev().collect());
          let id = self.global.register_fetch(fetch);
          self.global.with_host(|host| host.http_get(id, &url))?;
        }
      }
    }
    debug_assert!(stack.is_empty(), "operand stack not balanced at end of chunk");
    Ok(())
  }

  /// Write a state entry, then fire its watchers in registration order.
  /// A failing watcher does not stop the remaining watchers of this write;
  /// the first failure surfaces once all have run.
  pub(crate) fn store(&mut self, name: Rc<str>, value: Value) -> Result<()> {
    self.global.put_state(name.clone(), value);
    let mut failure = None;
    for watcher in self.global.watchers(&name) {
      if let Err(error) = self.run_frame(&watcher, None) {
        failure.get_or_insert(error);
      }
    }
    match failure {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }
}

fn constant(chunk: &Chunk, index: Const) -> Result<&Constant, Error> {
  chunk
    .constants
    .get(index.index())
    .ok_or(Error::BadConstant(index.0))
}

fn constant_str(chunk: &Chunk, index: Const) -> Result<&str, Error> {
  match constant(chunk, index)? {
    Constant::String(name) => Ok(name),
    other => Err(Error::Mismatch {
      expected: "string",
      found: other.kind(),
    }),
  }
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, Error> {
  stack.pop().ok_or(Error::StackUnderflow)
}

fn pop_str(stack: &mut Vec<Value>) -> Result<Rc<str>, Error> {
  match pop(stack)? {
    Value::Str(value) => Ok(value),
    other => Err(Error::Mismatch {
      expected: "string",
      found: other.kind(),
    }),
  }
}

fn pop_chunk(stack: &mut Vec<Value>) -> Result<Rc<Chunk>, Error> {
  match pop(stack)? {
    Value::Chunk(value) => Ok(value),
    other => Err(Error::Mismatch {
      expected: "block",
      found: other.kind(),
    }),
  }
}

fn pop_object(stack: &mut Vec<Value>) -> Result<Rc<Object>, Error> {
  match pop(stack)? {
    Value::Object(value) => Ok(value),
    other => Err(Error::Mismatch {
      expected: "object",
      found: other.kind(),
    }),
  }
}
