use super::*;

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Env::global();

        builtins::register(&globals);
        string::register(&globals);

        Interpreter {
            globals,
            heap: HeapManager::new(),
            modules: ModuleManager::new(),
            out: Box::new(std::io::stdout()),
        }
    }

    /// Route `Result:` lines and `__put` output to `out`.
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    /// Directory that top-level relative imports resolve against.
    pub fn set_base_dir(&mut self, dir: impl AsRef<Path>) {
        self.modules.set_base_dir(dir.as_ref());
    }

    pub fn globals(&self) -> &Env {
        &self.globals
    }

    pub fn heap(&self) -> &HeapManager {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut HeapManager {
        &mut self.heap
    }

    pub fn modules(&self) -> &ModuleManager {
        &self.modules
    }

    // -------------------------------------------------------------------------
    // Calls
    // -------------------------------------------------------------------------

    pub(super) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        caller: &Frame,
    ) -> Result<Value, RuntimeError> {
        let callable = match callee {
            Value::Callable(c) => c,
            Value::Void => return Err(RuntimeError::VoidUsage),
            other => return Err(RuntimeError::NotCallable(other.type_name().to_string())),
        };
        if args.len() != callable.arity() {
            return Err(RuntimeError::Arity {
                expected: callable.arity(),
                got: args.len(),
            });
        }

        match callable {
            Callable::Function { decl, closure } => {
                tracing::trace!(name = %decl.name, "call function");
                let frame = caller.with_env(closure.child());
                self.bind_params(&frame.env, &decl.params, args)?;
                let flow = self.exec_body(&decl.body, &frame)?;
                self.finish_call(&decl, flow)
            }
            Callable::BoundMethod { receiver, method } => {
                let (result, _) = self.call_method(receiver, &method, args, caller)?;
                Ok(result)
            }
            Callable::Builtin(builtin) => self.call_builtin(builtin, args),
        }
    }

    /// Run `method` against `receiver`. Returns the call result and the
    /// receiver after the body ran, so a struct copy can be written back.
    pub(super) fn call_method(
        &mut self,
        receiver: Receiver,
        method: &Rc<FnDecl>,
        args: Vec<Value>,
        caller: &Frame,
    ) -> Result<(Value, Receiver), RuntimeError> {
        if args.len() != method.params.len() {
            return Err(RuntimeError::Arity {
                expected: method.params.len(),
                got: args.len(),
            });
        }
        tracing::trace!(name = %method.name, "call method");

        let frame = self.method_frame(&receiver, caller)?;
        self.bind_params(&frame.env, &method.params, args)?;
        let flow = self.exec_body(&method.body, &frame)?;
        let receiver = self.write_back_fields(receiver, &frame.env)?;
        let result = self.finish_call(method, flow)?;
        Ok((result, receiver))
    }

    /// Run a constructor body against a freshly defaulted instance.
    pub(super) fn run_constructor(
        &mut self,
        receiver: Receiver,
        ctor: &Rc<FnDecl>,
        args: Vec<Value>,
        caller: &Frame,
    ) -> Result<Receiver, RuntimeError> {
        if args.len() != ctor.params.len() {
            return Err(RuntimeError::Arity {
                expected: ctor.params.len(),
                got: args.len(),
            });
        }
        tracing::trace!(name = %ctor.name, "call constructor");

        let frame = self.method_frame(&receiver, caller)?;
        self.bind_params(&frame.env, &ctor.params, args)?;
        // A `return` only ends the constructor early.
        self.exec_body(&ctor.body, &frame)?;
        self.write_back_fields(receiver, &frame.env)
    }

    /// Scope for a method body: `this` plus one local per field.
    fn method_frame(&self, receiver: &Receiver, caller: &Frame) -> Result<Frame, RuntimeError> {
        let env = self.globals.child();
        let fields = match receiver {
            Receiver::Struct(s) => {
                env.define("this", Value::Struct((**s).clone()));
                s.fields.clone()
            }
            Receiver::Class(r) => {
                env.define("this", Value::Object(*r));
                match self.heap.get(*r) {
                    Some(HeapObject::Instance(inst)) => inst.fields.clone(),
                    _ => return Err(RuntimeError::DanglingReference),
                }
            }
        };
        for (name, value) in fields.0 {
            env.define(name, value);
        }
        Ok(caller.with_env(env))
    }

    /// Copy every field's local binding back into the receiver.
    fn write_back_fields(&mut self, receiver: Receiver, env: &Env) -> Result<Receiver, RuntimeError> {
        match receiver {
            Receiver::Struct(mut s) => {
                for (name, slot) in s.fields.0.iter_mut() {
                    if let Some(v) = env.get_by_name(name) {
                        *slot = v;
                    }
                }
                Ok(Receiver::Struct(s))
            }
            Receiver::Class(r) => {
                let Some(HeapObject::Instance(inst)) = self.heap.get_mut(r) else {
                    return Err(RuntimeError::DanglingReference);
                };
                for (name, slot) in inst.fields.0.iter_mut() {
                    if let Some(v) = env.get_by_name(name) {
                        *slot = v;
                    }
                }
                Ok(Receiver::Class(r))
            }
        }
    }

    fn bind_params(&mut self, env: &Env, params: &[Param], args: Vec<Value>) -> Result<(), RuntimeError> {
        for (param, arg) in params.iter().zip(args) {
            env.define(param.name.clone(), types::coerce(&param.ty, arg)?);
        }
        Ok(())
    }

    /// Apply the declared return type to how the body finished.
    fn finish_call(&mut self, decl: &FnDecl, flow: Flow) -> Result<Value, RuntimeError> {
        let returns_void = decl.ret.base == TypeName::Void && !decl.ret.is_array();
        match flow {
            Flow::Return(Value::Null) if returns_void => Ok(Value::Void),
            Flow::Return(_) if returns_void => Err(RuntimeError::VoidReturn(decl.name.clone())),
            Flow::Return(Value::Null) => Ok(Value::Null),
            Flow::Return(value) => types::coerce(&decl.ret, value),
            Flow::Normal => Ok(types::default_value(&decl.ret, &mut self.heap)),
        }
    }

    /// Statements of a function body, run directly in `frame` without an
    /// extra block scope.
    pub(super) fn exec_body(&mut self, body: &[Stmt], frame: &Frame) -> Result<Flow, RuntimeError> {
        for stmt in body {
            if let Flow::Return(value) = self.exec(stmt, frame)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        // Function values hold their defining scope; clearing the roots
        // lets those scopes drop.
        self.globals.clear();
        self.modules.clear();
    }
}
