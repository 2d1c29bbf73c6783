use super::*;

impl Interpreter {
    pub(super) fn exec(&mut self, stmt: &Stmt, frame: &Frame) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                let value = self.eval(expr, frame)?;
                if !matches!(value, Value::Void) && !expr.is_silent() {
                    let line = repr(&value, &self.heap);
                    writeln!(self.out, "Result: {}", line)
                        .map_err(|e| RuntimeError::Output(e.to_string()))?;
                }
                Ok(Flow::Normal)
            }

            Stmt::Block(stmts) => self.exec_body(stmts, &frame.child()),

            Stmt::If(cond, then_branch, else_branch) => {
                if self.eval(cond, frame)?.is_truthy() {
                    self.exec(then_branch, frame)
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch, frame)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While(cond, body) => {
                while self.eval(cond, frame)?.is_truthy() {
                    if let Flow::Return(value) = self.exec(body, frame)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                let frame = frame.child();
                if let Some(init) = init {
                    self.exec(init, &frame)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.eval(cond, &frame)?.is_truthy() {
                            break;
                        }
                    }
                    if let Flow::Return(value) = self.exec(body, &frame)? {
                        return Ok(Flow::Return(value));
                    }
                    if let Some(step) = step {
                        self.eval(step, &frame)?;
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr, frame)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }

            Stmt::VarDecl(decl) => {
                self.exec_var_decl(decl, frame)?;
                Ok(Flow::Normal)
            }

            Stmt::FunctionDecl(decl) => {
                let value = Value::Callable(Callable::Function {
                    decl: Rc::clone(decl),
                    closure: frame.env.clone(),
                });
                self.declare_global(&decl.name, value, decl.exported, frame);
                Ok(Flow::Normal)
            }

            Stmt::StructDecl(decl) => {
                let def = Rc::new(TypeDef::from_decl(decl));
                self.declare_global(&decl.name, Value::StructType(def), decl.exported, frame);
                Ok(Flow::Normal)
            }

            Stmt::ClassDecl(decl) => {
                let def = Rc::new(TypeDef::from_decl(decl));
                self.declare_global(&decl.name, Value::ClassType(def), decl.exported, frame);
                Ok(Flow::Normal)
            }

            Stmt::Import { path, alias } => {
                let exports = self.import_module(path)?;
                match alias {
                    Some(alias) => frame.env.define(alias.clone(), Value::Module(exports)),
                    None => {
                        for (name, value) in exports.iter() {
                            frame.env.define(name.clone(), value.clone());
                        }
                    }
                }
                Ok(Flow::Normal)
            }
        }
    }

    fn exec_var_decl(&mut self, decl: &VarDecl, frame: &Frame) -> Result<(), RuntimeError> {
        if decl.ty.base == TypeName::Void && !decl.ty.is_array() {
            return Err(RuntimeError::Type(format!(
                "Cannot declare variable '{}' of type void",
                decl.name
            )));
        }
        let value = match &decl.init {
            Some(init) => {
                let value = self.eval(init, frame)?;
                types::coerce_init(&decl.ty, value)?
            }
            None => types::default_value(&decl.ty, &mut self.heap),
        };
        if decl.exported {
            if let Some(module) = &frame.module {
                module.borrow_mut().export(decl.name.clone(), value.clone());
            }
        }
        frame.env.define(decl.name.clone(), value);
        Ok(())
    }

    /// Functions and types always live in the global scope.
    fn declare_global(&mut self, name: &str, value: Value, exported: bool, frame: &Frame) {
        if exported {
            if let Some(module) = &frame.module {
                module.borrow_mut().export(name, value.clone());
            }
        }
        self.globals.define(name, value);
    }

    // -------------------------------------------------------------------------
    // Modules
    // -------------------------------------------------------------------------

    /// Resolve, load (once) and return the export table of `raw_path`.
    pub(super) fn import_module(
        &mut self,
        raw_path: &str,
    ) -> Result<Rc<HashMap<String, Value>>, RuntimeError> {
        let path = self.modules.resolve_path(raw_path);
        match self.modules.begin_load(&path)? {
            Lookup::Cached(exports) => Ok(exports),
            Lookup::Load(handle) => {
                tracing::debug!(path = %path.display(), "loading module");
                let result = self.exec_module(&path, handle);
                let exports = self.modules.finish_load(&path, result.is_ok());
                result?;
                exports.ok_or_else(|| {
                    RuntimeError::Internal(format!("module '{}' vanished while loading", path.display()))
                })
            }
        }
    }

    fn exec_module(&mut self, path: &Path, handle: ModuleHandle) -> Result<(), RuntimeError> {
        let load_error = |reason: String| RuntimeError::ModuleLoad {
            path: path.display().to_string(),
            reason,
        };
        let source = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let stmts = parse_source(&source).map_err(|e| load_error(e.to_string()))?;

        let frame = Frame {
            env: self.globals.child(),
            module: Some(handle),
        };
        for stmt in &stmts {
            if let Flow::Return(_) = self.exec(stmt, &frame)? {
                return Err(load_error("'return' outside of a function".to_string()));
            }
        }
        Ok(())
    }
}
