use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::*;
use crate::environment::Env;
use crate::heap::{HeapManager, HeapObject, ObjectRef};
use crate::lexer::LexerError;
use crate::modules::{Lookup, ModuleHandle, ModuleManager};
use crate::parser::ParseError;
use crate::source::parse_source;
use crate::types::{self, numeric, string};
// Re-export value types so `kscript::interpreter::Value` imports work.
pub use crate::value::{
    repr, ArrayValue, Builtin, Callable, ClassInstance, Fields, Receiver, RuntimeError,
    StructInstance, TypeDef, Value,
};

/// Everything that can stop a program: front-end failures and runtime errors.
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Lex(#[from] LexerError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Execution context threaded through every statement and expression:
/// the innermost scope and the module being loaded, if any. Entering a
/// scope builds a new frame, so the caller's frame is untouched on every
/// exit path.
#[derive(Clone)]
pub(crate) struct Frame {
    env: Env,
    module: Option<ModuleHandle>,
}

impl Frame {
    fn child(&self) -> Frame {
        Frame {
            env: self.env.child(),
            module: self.module.clone(),
        }
    }

    fn with_env(&self, env: Env) -> Frame {
        Frame {
            env,
            module: self.module.clone(),
        }
    }
}

/// How a statement finished.
pub(crate) enum Flow {
    Normal,
    /// `return` carrying its value (`null` for a bare `return;`).
    Return(Value),
}

pub struct Interpreter {
    globals: Env,
    heap: HeapManager,
    modules: ModuleManager,
    out: Box<dyn Write>,
}

mod api;
mod arrays;
mod builtins;
mod core;
mod eval;
mod exec;
mod objects;
mod ops;
mod places;
