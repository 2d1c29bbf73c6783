/// String built-ins. Positions and lengths count UTF-16 code units.
///
/// Functions:
///   length(s)     → int, number of code units
///   charAt(s, i)  → char, code unit at `i` (bounds-checked)
use crate::environment::Env;
use crate::heap::HeapManager;
use crate::value::{Builtin, Callable, RuntimeError, Value};

pub fn register(global: &Env) {
    for builtin in [Builtin::Length, Builtin::CharAt] {
        global.define(builtin.name(), Value::Callable(Callable::Builtin(builtin)));
    }
}

/// Returns `Some(result)` when `builtin` is owned by this module, `None` otherwise.
pub fn call(
    builtin: Builtin,
    args: &[Value],
    heap: &HeapManager,
) -> Option<Result<Value, RuntimeError>> {
    match builtin {
        Builtin::Length => Some(length(args, heap)),
        Builtin::CharAt => Some(char_at(args, heap)),
        Builtin::Put => None,
    }
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

fn string_arg<'h>(
    fn_name: &str,
    arg: &Value,
    heap: &'h HeapManager,
) -> Result<&'h str, RuntimeError> {
    match arg {
        Value::Str(r) => heap.string(*r).ok_or(RuntimeError::DanglingReference),
        Value::Void => Err(RuntimeError::VoidUsage),
        other => Err(RuntimeError::Type(format!(
            "{}: argument must be a string, got {}",
            fn_name,
            other.type_name()
        ))),
    }
}

fn length(args: &[Value], heap: &HeapManager) -> Result<Value, RuntimeError> {
    let [s] = args else {
        return Err(RuntimeError::Arity {
            expected: 1,
            got: args.len(),
        });
    };
    let s = string_arg("length", s, heap)?;
    Ok(Value::Int(s.encode_utf16().count() as i32))
}

fn char_at(args: &[Value], heap: &HeapManager) -> Result<Value, RuntimeError> {
    let [s, index] = args else {
        return Err(RuntimeError::Arity {
            expected: 2,
            got: args.len(),
        });
    };
    let s = string_arg("charAt", s, heap)?;
    let Value::Int(i) = index else {
        return Err(RuntimeError::Type(format!(
            "charAt: index must be an int, got {}",
            index.type_name()
        )));
    };
    let unit = usize::try_from(*i)
        .ok()
        .and_then(|i| s.encode_utf16().nth(i))
        .ok_or_else(|| {
            RuntimeError::IndexOutOfRange(format!(
                "String index out of range: {} (length {})",
                i,
                s.encode_utf16().count()
            ))
        })?;
    Ok(Value::Char(unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_utf16_units() {
        let mut heap = HeapManager::new();
        let s = heap.alloc_string("héllo😀");
        let n = call(Builtin::Length, &[s], &heap).unwrap().unwrap();
        assert_eq!(n, Value::Int(7));
    }

    #[test]
    fn char_at_is_bounds_checked() {
        let mut heap = HeapManager::new();
        let s = heap.alloc_string("abc");
        let c = call(Builtin::CharAt, &[s.clone(), Value::Int(1)], &heap).unwrap();
        assert_eq!(c, Ok(Value::Char(b'b' as u16)));
        let err = call(Builtin::CharAt, &[s, Value::Int(3)], &heap).unwrap();
        assert!(matches!(err, Err(RuntimeError::IndexOutOfRange(_))));
    }
}
