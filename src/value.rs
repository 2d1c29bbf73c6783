/// Core runtime value type and associated utilities.
///
/// Lives in its own module so the environment, the heap and the
/// interpreter can all import it without circular dependencies.
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{Expr, FnDecl, TypeDecl, TypeName, TypeRef};
use crate::environment::Env;
use crate::heap::{HeapManager, HeapObject, ObjectRef};

// ---------------------------------------------------------------------------
// RuntimeError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("{0}")]
    TypeConversion(String),
    #[error("Cannot use the result of a void call as a value")]
    VoidUsage,
    #[error("Void function '{0}' cannot return a value")]
    VoidReturn(String),
    #[error("Expected {expected} arguments but got {got}")]
    Arity { expected: usize, got: usize },
    #[error("Can only call functions and methods, got {0}")]
    NotCallable(String),
    #[error("Cannot index non-array value of type {0}")]
    NotIndexable(String),
    #[error("{0}")]
    IndexOutOfRange(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulo by zero")]
    ModuloByZero,
    #[error("Failed to load module '{path}': {reason}")]
    ModuleLoad { path: String, reason: String },
    #[error("Circular import: {0}")]
    CyclicImport(String),
    #[error("{0}")]
    MemberNotFound(String),
    #[error("{0}")]
    InvalidAssignmentTarget(String),
    #[error("{0}")]
    Type(String),
    #[error("Dangling reference to a collected heap object")]
    DanglingReference,
    #[error("Output error: {0}")]
    Output(String),
    /// A `return` escaped every call frame.
    #[error("Internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// Runtime definition shared by struct and class declarations.
#[derive(Debug, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub fields: Vec<(String, TypeRef)>,
    /// Field initialiser expressions, evaluated for every new instance.
    pub initializers: Vec<(String, Expr)>,
    pub methods: HashMap<String, Rc<FnDecl>>,
    pub constructor: Option<Rc<FnDecl>>,
}

impl TypeDef {
    pub fn from_decl(decl: &TypeDecl) -> Self {
        TypeDef {
            name: decl.name.clone(),
            fields: decl
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.ty.clone()))
                .collect(),
            initializers: decl
                .fields
                .iter()
                .filter_map(|f| Some((f.name.clone(), f.init.clone()?)))
                .collect(),
            methods: decl
                .methods
                .iter()
                .map(|m| (m.name.clone(), Rc::clone(m)))
                .collect(),
            constructor: decl.constructor.clone(),
        }
    }
}

/// Ordered field storage used by both struct and class instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Fields(pub Vec<(String, Value)>);

impl Fields {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }
}

/// Value-semantics object: cloning it copies every field.
#[derive(Debug, Clone, PartialEq)]
pub struct StructInstance {
    pub def: Rc<TypeDef>,
    pub fields: Fields,
}

/// Reference-semantics object; lives in the heap and is shared by `ObjectRef`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInstance {
    pub def: Rc<TypeDef>,
    pub fields: Fields,
}

/// Fixed element type, rank 1..=3, row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub elem: TypeName,
    pub dims: Vec<usize>,
    pub data: Vec<Value>,
}

impl ArrayValue {
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Row-major offset of `indices`, bounds-checked.
    pub fn offset(&self, indices: &[i32]) -> Result<usize, RuntimeError> {
        if indices.len() != self.dims.len() {
            return Err(RuntimeError::IndexOutOfRange(format!(
                "Array of rank {} indexed with {} indices",
                self.dims.len(),
                indices.len()
            )));
        }
        let mut offset = 0usize;
        for (&idx, &dim) in indices.iter().zip(&self.dims) {
            if idx < 0 || idx as usize >= dim {
                return Err(RuntimeError::IndexOutOfRange(format!(
                    "Array index out of bounds: {} (length {})",
                    idx, dim
                )));
            }
            offset = offset * dim + idx as usize;
        }
        Ok(offset)
    }
}

// ---------------------------------------------------------------------------
// Callables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `__put(char)`: write one character to the output sink.
    Put,
    /// `length(string) -> int`
    Length,
    /// `charAt(string, int) -> char`
    CharAt,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Put => "__put",
            Builtin::Length => "length",
            Builtin::CharAt => "charAt",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::Put | Builtin::Length => 1,
            Builtin::CharAt => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    /// A copy of the struct; the caller writes it back after the call.
    Struct(Box<StructInstance>),
    Class(ObjectRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    Function { decl: Rc<FnDecl>, closure: Env },
    BoundMethod { receiver: Receiver, method: Rc<FnDecl> },
    Builtin(Builtin),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Function { decl, .. } => decl.params.len(),
            Callable::BoundMethod { method, .. } => method.params.len(),
            Callable::Builtin(b) => b.arity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    /// Produced only by mixed-type arithmetic fallback.
    Double(f64),
    Bool(bool),
    /// One UTF-16 code unit.
    Char(u16),
    Array(ArrayValue),
    Struct(StructInstance),
    /// Class instance handle.
    Object(ObjectRef),
    /// String instance handle.
    Str(ObjectRef),
    Callable(Callable),
    Module(Rc<HashMap<String, Value>>),
    StructType(Rc<TypeDef>),
    ClassType(Rc<TypeDef>),
    /// Result of calling a void function.
    Void,
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Object(_) => "class",
            Value::Str(_) => "string",
            Value::Callable(_) => "function",
            Value::Module(_) => "module",
            Value::StructType(_) | Value::ClassType(_) => "type",
            Value::Void => "void",
            Value::Null => "null",
        }
    }

    /// null is false, a bool is itself, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Pushes every heap handle reachable from this value without
    /// going through the heap.
    pub fn collect_refs(&self, out: &mut Vec<ObjectRef>) {
        match self {
            Value::Object(r) | Value::Str(r) => out.push(*r),
            Value::Array(arr) => arr.data.iter().for_each(|v| v.collect_refs(out)),
            Value::Struct(s) => s.fields.values().for_each(|v| v.collect_refs(out)),
            Value::Module(exports) => exports.values().for_each(|v| v.collect_refs(out)),
            Value::Callable(Callable::BoundMethod { receiver, .. }) => match receiver {
                Receiver::Struct(s) => s.fields.values().for_each(|v| v.collect_refs(out)),
                Receiver::Class(r) => out.push(*r),
            },
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn repr_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        f.to_string()
    }
}

/// Human-readable representation used for `Result:` lines.
pub fn repr(val: &Value, heap: &HeapManager) -> String {
    match val {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => {
            if f.is_finite() {
                f.to_string()
            } else {
                repr_float(*f as f64)
            }
        }
        Value::Double(d) => repr_float(*d),
        Value::Bool(b) => if *b { "True" } else { "False" }.to_string(),
        Value::Char(c) => String::from_utf16_lossy(&[*c]),
        Value::Array(arr) => repr_array(arr, heap),
        Value::Struct(s) => s.def.name.clone(),
        Value::Object(r) => match heap.get(*r) {
            Some(HeapObject::Instance(inst)) => inst.def.name.clone(),
            _ => "<freed object>".to_string(),
        },
        Value::Str(r) => match heap.get(*r) {
            Some(HeapObject::Str(s)) => s.clone(),
            _ => "<freed string>".to_string(),
        },
        Value::Callable(Callable::Function { decl, .. }) => format!("<fn {}>", decl.name),
        Value::Callable(Callable::BoundMethod { method, .. }) => {
            format!("<bound method {}>", method.name)
        }
        Value::Callable(Callable::Builtin(b)) => format!("<builtin {}>", b.name()),
        Value::Module(_) => "<module>".to_string(),
        Value::StructType(def) => format!("<struct {}>", def.name),
        Value::ClassType(def) => format!("<class {}>", def.name),
        Value::Void => "void".to_string(),
        Value::Null => "null".to_string(),
    }
}

fn repr_array(arr: &ArrayValue, heap: &HeapManager) -> String {
    fn level(data: &[Value], dims: &[usize], heap: &HeapManager) -> String {
        match dims {
            [] | [_] => {
                let parts: Vec<String> = data.iter().map(|v| repr(v, heap)).collect();
                format!("{{{}}}", parts.join(", "))
            }
            [rows, rest @ ..] => {
                let stride: usize = rest.iter().product();
                let parts: Vec<String> = (0..*rows)
                    .map(|r| level(&data[r * stride..(r + 1) * stride], rest, heap))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
    level(&arr.data, &arr.dims, heap)
}
