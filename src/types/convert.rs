/// Primitive conversions used by declarations, assignments, parameter
/// binding and return values.
///
/// `null` converts to the supplied default or fails; int, float, char and
/// bool interconvert with C-style truncation and non-zero tests.
use crate::value::{RuntimeError, Value};

fn null_error(target: &str) -> RuntimeError {
    RuntimeError::TypeConversion(format!("Cannot assign null to {} variable", target))
}

fn cannot_convert(value: &Value, target: &str) -> RuntimeError {
    match value {
        Value::Void => RuntimeError::VoidUsage,
        other => RuntimeError::TypeConversion(format!(
            "Cannot convert {} to {}",
            other.type_name(),
            target
        )),
    }
}

pub fn to_int(value: &Value, default: Option<i32>) -> Result<i32, RuntimeError> {
    match value {
        Value::Null => default.ok_or_else(|| null_error("int")),
        Value::Int(i) => Ok(*i),
        Value::Float(f) => Ok(*f as i32),
        Value::Double(d) => Ok(*d as i32),
        Value::Char(c) => Ok(*c as i32),
        Value::Bool(b) => Ok(*b as i32),
        other => Err(cannot_convert(other, "int")),
    }
}

pub fn to_float(value: &Value, default: Option<f32>) -> Result<f32, RuntimeError> {
    match value {
        Value::Null => default.ok_or_else(|| null_error("float")),
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f32),
        Value::Double(d) => Ok(*d as f32),
        Value::Char(c) => Ok(*c as f32),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(cannot_convert(other, "float")),
    }
}

/// Numeric sources wrap into the 16-bit range.
pub fn to_char(value: &Value, default: Option<u16>) -> Result<u16, RuntimeError> {
    match value {
        Value::Null => default.ok_or_else(|| null_error("char")),
        Value::Char(c) => Ok(*c),
        Value::Int(i) => Ok(*i as u16),
        Value::Float(f) => Ok(*f as i32 as u16),
        Value::Double(d) => Ok(*d as i32 as u16),
        Value::Bool(b) => Ok(*b as u16),
        other => Err(cannot_convert(other, "char")),
    }
}

pub fn to_bool(value: &Value, default: Option<bool>) -> Result<bool, RuntimeError> {
    match value {
        Value::Null => default.ok_or_else(|| null_error("bool")),
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0),
        Value::Double(d) => Ok(*d != 0.0),
        Value::Char(c) => Ok(*c != 0),
        other => Err(cannot_convert(other, "bool")),
    }
}

/// Widening used by comparisons and the double arithmetic fallback.
pub fn to_double(value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f as f64),
        Value::Double(d) => Ok(*d),
        Value::Char(c) => Ok(*c as f64),
        Value::Void => Err(RuntimeError::VoidUsage),
        other => Err(RuntimeError::Type(format!(
            "Invalid numeric type: {}",
            other.type_name()
        ))),
    }
}
