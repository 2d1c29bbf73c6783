use super::*;

impl Interpreter {
    // -------------------------------------------------------------------------
    // Member access
    // -------------------------------------------------------------------------

    /// Module export, then field, then method (as a bound method).
    pub(super) fn get_member(&self, object: Value, name: &str) -> Result<Value, RuntimeError> {
        match object {
            Value::Module(exports) => exports.get(name).cloned().ok_or_else(|| {
                RuntimeError::MemberNotFound(format!("Module does not export '{}'", name))
            }),
            Value::Struct(s) => {
                if let Some(value) = s.fields.get(name) {
                    return Ok(value.clone());
                }
                match s.def.methods.get(name).cloned() {
                    Some(method) => Ok(Value::Callable(Callable::BoundMethod {
                        receiver: Receiver::Struct(Box::new(s)),
                        method,
                    })),
                    None => Err(RuntimeError::MemberNotFound(format!(
                        "Struct '{}' has no field or method '{}'",
                        s.def.name, name
                    ))),
                }
            }
            Value::Object(r) => match self.heap.get(r) {
                Some(HeapObject::Instance(inst)) => {
                    if let Some(value) = inst.fields.get(name) {
                        return Ok(value.clone());
                    }
                    match inst.def.methods.get(name).cloned() {
                        Some(method) => Ok(Value::Callable(Callable::BoundMethod {
                            receiver: Receiver::Class(r),
                            method,
                        })),
                        None => Err(RuntimeError::MemberNotFound(format!(
                            "Class '{}' has no field or method '{}'",
                            inst.def.name, name
                        ))),
                    }
                }
                Some(HeapObject::Str(_)) => Err(RuntimeError::MemberNotFound(format!(
                    "string has no member '{}'",
                    name
                ))),
                None => Err(RuntimeError::DanglingReference),
            },
            Value::Null => Err(RuntimeError::Type(format!(
                "Cannot access member '{}' of null",
                name
            ))),
            Value::Void => Err(RuntimeError::VoidUsage),
            other => Err(RuntimeError::Type(format!(
                "Cannot access member '{}' of a {}",
                name,
                other.type_name()
            ))),
        }
    }

    /// `object.field = value`; the value is coerced to the field's current type.
    pub(super) fn assign_member(
        &mut self,
        object: &Expr,
        field: &str,
        value: Value,
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(object, frame)?;
        let place = self.member_place(place, field, frame)?;
        place.ensure_writable()?;
        self.with_place_mut(&place, frame, |slot| {
            *slot = types::coerce_like(slot, value)?;
            Ok(slot.clone())
        })
    }

    /// `object.name(args)`. A struct method runs on a copy that is then
    /// written back to wherever the struct lives.
    pub(super) fn call_member(
        &mut self,
        object: &Expr,
        name: &str,
        args: &[Expr],
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(object, frame)?;
        let target = self.read_place(&place, frame)?;

        let method = match &target {
            Value::Struct(s) if s.fields.get(name).is_none() => s.def.methods.get(name).cloned(),
            _ => None,
        };
        let (Some(method), Value::Struct(s)) = (method, &target) else {
            let callee = self.get_member(target, name)?;
            let args = self.eval_args(args, frame)?;
            return self.call_value(callee, args, frame);
        };

        let args = self.eval_args(args, frame)?;
        let receiver = Receiver::Struct(Box::new(s.clone()));
        let (result, receiver) = self.call_method(receiver, &method, args, frame)?;
        if let Receiver::Struct(updated) = receiver {
            self.with_place_mut(&place, frame, |slot| {
                *slot = Value::Struct(*updated);
                Ok(())
            })?;
        }
        Ok(result)
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub(super) fn eval_struct_new(
        &mut self,
        name: &str,
        args: &[Expr],
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        match self.globals.get_by_name(name) {
            Some(Value::StructType(def)) => {
                let args = self.eval_args(args, frame)?;
                self.construct_struct(def, args, frame)
            }
            // `new Name(...)` is also how classes are written.
            Some(Value::ClassType(def)) => {
                let args = self.eval_args(args, frame)?;
                self.construct_class(def, args, frame)
            }
            _ => Err(RuntimeError::Type(format!("'{}' is not a struct type", name))),
        }
    }

    pub(super) fn eval_class_new(
        &mut self,
        name: &str,
        args: &[Expr],
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        match self.globals.get_by_name(name) {
            Some(Value::ClassType(def)) => {
                let args = self.eval_args(args, frame)?;
                self.construct_class(def, args, frame)
            }
            _ => Err(RuntimeError::Type(format!("'{}' is not a class type", name))),
        }
    }

    fn construct_struct(
        &mut self,
        def: Rc<TypeDef>,
        args: Vec<Value>,
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        let instance = StructInstance {
            fields: self.initial_fields(&def)?,
            def: Rc::clone(&def),
        };
        let Some(ctor) = &def.constructor else {
            no_constructor_args(&args)?;
            return Ok(Value::Struct(instance));
        };
        match self.run_constructor(Receiver::Struct(Box::new(instance)), ctor, args, frame)? {
            Receiver::Struct(s) => Ok(Value::Struct(*s)),
            Receiver::Class(_) => Err(RuntimeError::Internal(
                "struct constructor produced a class instance".to_string(),
            )),
        }
    }

    /// The instance is allocated (and rooted) before its constructor runs.
    fn construct_class(
        &mut self,
        def: Rc<TypeDef>,
        args: Vec<Value>,
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        let instance = ClassInstance {
            fields: self.initial_fields(&def)?,
            def: Rc::clone(&def),
        };
        let handle = self.heap.allocate(HeapObject::Instance(instance));
        match &def.constructor {
            Some(ctor) => {
                self.run_constructor(Receiver::Class(handle), ctor, args, frame)?;
            }
            None => no_constructor_args(&args)?,
        }
        Ok(Value::Object(handle))
    }

    /// Declared fields in order: the initialiser if one is written,
    /// otherwise the element default (arrays start as null).
    fn initial_fields(&mut self, def: &TypeDef) -> Result<Fields, RuntimeError> {
        let mut fields = Vec::with_capacity(def.fields.len());
        for (name, ty) in &def.fields {
            let init = def.initializers.iter().find(|(n, _)| n == name);
            let value = match init {
                Some((_, expr)) => {
                    let frame = Frame {
                        env: self.globals.clone(),
                        module: None,
                    };
                    let value = self.eval(expr, &frame)?;
                    types::coerce(ty, value)?
                }
                None if ty.is_array() => Value::Null,
                None => types::element_default(&ty.base),
            };
            fields.push((name.clone(), value));
        }
        Ok(Fields(fields))
    }
}

fn no_constructor_args(args: &[Value]) -> Result<(), RuntimeError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(RuntimeError::Arity {
            expected: 0,
            got: args.len(),
        })
    }
}
