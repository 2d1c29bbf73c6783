use super::*;

impl Interpreter {
    /// Execute a parsed program at global scope. Any runtime error aborts
    /// the program.
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), InterpretError> {
        let frame = Frame {
            env: self.globals.clone(),
            module: None,
        };
        let result = self.run_toplevel(stmts, &frame);
        self.out
            .flush()
            .map_err(|e| RuntimeError::Output(e.to_string()))?;
        Ok(result?)
    }

    fn run_toplevel(&mut self, stmts: &[Stmt], frame: &Frame) -> Result<(), RuntimeError> {
        for stmt in stmts {
            if let Flow::Return(_) = self.exec(stmt, frame)? {
                return Err(RuntimeError::Internal(
                    "'return' outside of a function".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Evaluate one expression at global scope without printing it.
    pub fn interpret_expression(&mut self, expr: &Expr) -> Result<Value, InterpretError> {
        let frame = Frame {
            env: self.globals.clone(),
            module: None,
        };
        Ok(self.eval(expr, &frame)?)
    }

    pub fn run_source(&mut self, source: &str) -> Result<(), InterpretError> {
        let stmts = parse_source(source)?;
        self.interpret(&stmts)
    }

    /// Run a program file; its directory becomes the import base.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<(), InterpretError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| RuntimeError::ModuleLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.set_base_dir(dir);
        }
        self.run_source(&source)
    }

    /// The `Result:` rendering of `value`.
    pub fn render(&self, value: &Value) -> String {
        repr(value, &self.heap)
    }

    /// Rebuild the root set from everything a program can still reach
    /// (globals, scopes captured by functions, module exports), then run a
    /// mark-sweep pass. Returns the number of objects freed.
    ///
    /// Function values are followed wherever they sit: in a scope, a
    /// struct field, an array element or a class instance on the heap.
    pub fn collect_garbage(&mut self) -> usize {
        let mut handles: HashSet<ObjectRef> = HashSet::new();
        let mut pending: Vec<Value> = self
            .modules
            .loaded_exports()
            .into_iter()
            .map(Value::Module)
            .collect();
        let mut scopes = vec![self.globals.clone()];
        let mut seen: Vec<Env> = Vec::new();

        loop {
            while let Some(value) = pending.pop() {
                match value {
                    Value::Object(r) | Value::Str(r) => {
                        if !handles.insert(r) {
                            continue;
                        }
                        if let Some(HeapObject::Instance(inst)) = self.heap.get(r) {
                            pending.extend(inst.fields.values().cloned());
                        }
                    }
                    Value::Array(arr) => pending.extend(arr.data),
                    Value::Struct(s) => pending.extend(s.fields.0.into_iter().map(|(_, v)| v)),
                    Value::Module(exports) => pending.extend(exports.values().cloned()),
                    Value::Callable(Callable::Function { closure, .. }) => scopes.push(closure),
                    Value::Callable(Callable::BoundMethod { receiver, .. }) => match receiver {
                        Receiver::Struct(s) => pending.push(Value::Struct(*s)),
                        Receiver::Class(r) => pending.push(Value::Object(r)),
                    },
                    _ => {}
                }
            }
            let Some(env) = scopes.pop() else {
                break;
            };
            if seen.iter().any(|s| s.ptr_eq(&env)) {
                continue;
            }
            pending.extend(env.local_bindings().into_iter().map(|(_, v)| v));
            if let Some(outer) = env.enclosing() {
                scopes.push(outer);
            }
            seen.push(env);
        }

        self.heap.set_roots(handles);
        self.heap.collect()
    }
}
