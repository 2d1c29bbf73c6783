use super::*;

pub(super) fn register(global: &Env) {
    global.define(Builtin::Put.name(), Value::Callable(Callable::Builtin(Builtin::Put)));
}

impl Interpreter {
    pub(super) fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if let Some(result) = string::call(builtin, &args, &self.heap) {
            return result;
        }
        match builtin {
            Builtin::Put => self.put_char(&args),
            other => Err(RuntimeError::Internal(format!(
                "unhandled builtin '{}'",
                other.name()
            ))),
        }
    }

    /// `__put(c)`: write one UTF-16 code unit to the output sink.
    fn put_char(&mut self, args: &[Value]) -> Result<Value, RuntimeError> {
        let [arg] = args else {
            return Err(RuntimeError::Arity {
                expected: 1,
                got: args.len(),
            });
        };
        let unit = match arg {
            Value::Char(c) => *c,
            Value::Int(i) => u16::try_from(*i).map_err(|_| {
                RuntimeError::TypeConversion(format!("__put: {} is not a valid character code", i))
            })?,
            Value::Void => return Err(RuntimeError::VoidUsage),
            other => {
                return Err(RuntimeError::TypeConversion(format!(
                    "__put expects a char, got {}",
                    other.type_name()
                )))
            }
        };
        let text = String::from_utf16_lossy(&[unit]);
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| RuntimeError::Output(e.to_string()))?;
        Ok(Value::Void)
    }
}
