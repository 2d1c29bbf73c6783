/// Declared-type semantics: default values and coercion of runtime values
/// into declared slots (variables, parameters, return values, array
/// elements).
///
/// Sub-modules:
/// - `convert`: primitive conversions (int, float, char, bool, double)
/// - `numeric`: arithmetic promotion, comparisons, `++`/`--` steps
/// - `string`: string built-ins (`length`, `charAt`)
pub mod convert;
pub mod numeric;
pub mod string;

use crate::ast::{TypeName, TypeRef};
use crate::heap::HeapManager;
use crate::value::{RuntimeError, Value};

pub fn type_label(ty: &TypeName) -> String {
    match ty {
        TypeName::Int => "int".to_string(),
        TypeName::Float => "float".to_string(),
        TypeName::Char => "char".to_string(),
        TypeName::Bool => "bool".to_string(),
        TypeName::Void => "void".to_string(),
        TypeName::Str => "string".to_string(),
        TypeName::Named(name) => name.clone(),
    }
}

/// Fill value for array elements of type `elem`.
pub fn element_default(elem: &TypeName) -> Value {
    match elem {
        TypeName::Int => Value::Int(0),
        TypeName::Float => Value::Float(0.0),
        TypeName::Char => Value::Char(0),
        TypeName::Bool => Value::Bool(false),
        TypeName::Str | TypeName::Named(_) | TypeName::Void => Value::Null,
    }
}

/// Initial value of an uninitialised variable (or a missing return) of
/// declared type `ty`. Strings get a fresh empty heap string.
pub fn default_value(ty: &TypeRef, heap: &mut HeapManager) -> Value {
    if ty.is_array() {
        return Value::Null;
    }
    match &ty.base {
        TypeName::Str => heap.alloc_string(""),
        TypeName::Void => Value::Void,
        other => element_default(other),
    }
}

/// Convert `value` for storage in a slot declared as `ty`.
///
/// Primitives convert; a struct is copied by the move itself; class and
/// string handles are shared.
pub fn coerce(ty: &TypeRef, value: Value) -> Result<Value, RuntimeError> {
    if let Value::Void = value {
        return Err(RuntimeError::VoidUsage);
    }
    if ty.is_array() {
        return match value {
            Value::Array(_) | Value::Null => Ok(value),
            other => Err(RuntimeError::TypeConversion(format!(
                "Cannot convert {} to {}[]",
                other.type_name(),
                type_label(&ty.base)
            ))),
        };
    }
    match &ty.base {
        TypeName::Int => convert::to_int(&value, None).map(Value::Int),
        TypeName::Float => convert::to_float(&value, None).map(Value::Float),
        TypeName::Char => convert::to_char(&value, None).map(Value::Char),
        TypeName::Bool => convert::to_bool(&value, None).map(Value::Bool),
        TypeName::Str => match value {
            Value::Str(_) | Value::Null => Ok(value),
            other => Err(RuntimeError::TypeConversion(format!(
                "Cannot convert {} to string",
                other.type_name()
            ))),
        },
        TypeName::Void => Err(RuntimeError::TypeConversion(
            "Cannot store a value in a void slot".to_string(),
        )),
        TypeName::Named(_) => Ok(value),
    }
}

/// `coerce` for a variable initialiser: `null` into a primitive yields the
/// type's default instead of failing.
pub fn coerce_init(ty: &TypeRef, value: Value) -> Result<Value, RuntimeError> {
    if ty.is_array() {
        return coerce(ty, value);
    }
    match &ty.base {
        TypeName::Int => convert::to_int(&value, Some(0)).map(Value::Int),
        TypeName::Float => convert::to_float(&value, Some(0.0)).map(Value::Float),
        TypeName::Char => convert::to_char(&value, Some(0)).map(Value::Char),
        TypeName::Bool => convert::to_bool(&value, Some(false)).map(Value::Bool),
        _ => coerce(ty, value),
    }
}

/// Coerce `value` to the dynamic type of what a slot currently holds.
/// Arrays, objects, strings and null pin nothing and pass through.
pub fn coerce_like(current: &Value, value: Value) -> Result<Value, RuntimeError> {
    if let Value::Void = value {
        return Err(RuntimeError::VoidUsage);
    }
    match current {
        Value::Int(_) => convert::to_int(&value, None).map(Value::Int),
        Value::Float(_) => convert::to_float(&value, None).map(Value::Float),
        Value::Double(_) => convert::to_double(&value).map(Value::Double),
        Value::Char(_) => convert::to_char(&value, None).map(Value::Char),
        Value::Bool(_) => convert::to_bool(&value, None).map(Value::Bool),
        Value::Array(_) | Value::Struct(_) | Value::Object(_) | Value::Str(_) | Value::Null => {
            Ok(value)
        }
        other => Err(RuntimeError::Type(format!(
            "Cannot assign to a binding holding a {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_per_declared_type() {
        let mut heap = HeapManager::new();
        let int = TypeRef::scalar(TypeName::Int);
        assert_eq!(default_value(&int, &mut heap), Value::Int(0));
        let arr = TypeRef { base: TypeName::Int, dims: 1 };
        assert_eq!(default_value(&arr, &mut heap), Value::Null);
        let s = default_value(&TypeRef::scalar(TypeName::Str), &mut heap);
        assert!(matches!(s, Value::Str(r) if heap.string(r) == Some("")));
    }

    #[test]
    fn null_initialiser_takes_primitive_default() {
        let int = TypeRef::scalar(TypeName::Int);
        assert_eq!(coerce_init(&int, Value::Null).unwrap(), Value::Int(0));
        let ch = TypeRef::scalar(TypeName::Char);
        assert_eq!(coerce_init(&ch, Value::Null).unwrap(), Value::Char(0));
        assert!(coerce(&int, Value::Null).is_err());
        let arr = TypeRef { base: TypeName::Int, dims: 1 };
        assert_eq!(coerce_init(&arr, Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn coerce_like_follows_current_value() {
        assert_eq!(coerce_like(&Value::Int(1), Value::Float(2.7)).unwrap(), Value::Int(2));
        assert_eq!(coerce_like(&Value::Null, Value::Int(3)).unwrap(), Value::Int(3));
        assert_eq!(coerce_like(&Value::Int(1), Value::Void), Err(RuntimeError::VoidUsage));
    }
}
