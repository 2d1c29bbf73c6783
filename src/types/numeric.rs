/// Arithmetic promotion and numeric operators.
///
/// int op int stays int (32-bit wrapping); char mixed with int stays char
/// (16-bit wrapping); float mixed with int is float; anything else widens
/// both sides to double. Division and modulo by zero fail for int and float
/// but follow IEEE rules for double.
use crate::ast::{BinOp, StepOp, UnaryOp};
use crate::types::convert::to_double;
use crate::value::{RuntimeError, Value};

fn wrap_char(n: i32) -> Value {
    Value::Char(n as u16)
}

/// Both operands as f32 when one is float and both are int or float.
fn float_pair(l: &Value, r: &Value) -> Option<(f32, f32)> {
    let as_f32 = |v: &Value| match v {
        Value::Int(i) => Some(*i as f32),
        Value::Float(f) => Some(*f),
        _ => None,
    };
    if matches!(l, Value::Float(_)) || matches!(r, Value::Float(_)) {
        Some((as_f32(l)?, as_f32(r)?))
    } else {
        None
    }
}

fn double_pair(l: &Value, r: &Value) -> Result<(f64, f64), RuntimeError> {
    Ok((to_double(l)?, to_double(r)?))
}

pub fn add(l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
        (Value::Char(c), Value::Int(i)) | (Value::Int(i), Value::Char(c)) => {
            Ok(wrap_char((*c as i32).wrapping_add(*i)))
        }
        (Value::Char(a), Value::Char(b)) => Ok(Value::Char(a.wrapping_add(*b))),
        _ => match float_pair(l, r) {
            Some((a, b)) => Ok(Value::Float(a + b)),
            None => double_pair(l, r).map(|(a, b)| Value::Double(a + b)),
        },
    }
}

pub fn sub(l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
        (Value::Char(c), Value::Int(i)) => Ok(wrap_char((*c as i32).wrapping_sub(*i))),
        (Value::Char(a), Value::Char(b)) => Ok(Value::Int(*a as i32 - *b as i32)),
        _ => match float_pair(l, r) {
            Some((a, b)) => Ok(Value::Float(a - b)),
            None => double_pair(l, r).map(|(a, b)| Value::Double(a - b)),
        },
    }
}

pub fn mul(l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
        _ => match float_pair(l, r) {
            Some((a, b)) => Ok(Value::Float(a * b)),
            None => double_pair(l, r).map(|(a, b)| Value::Double(a * b)),
        },
    }
}

pub fn div(l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    match (l, r) {
        (Value::Int(_), Value::Int(0)) => Err(RuntimeError::DivisionByZero),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_div(*b))),
        _ => match float_pair(l, r) {
            Some((_, b)) if b == 0.0 => Err(RuntimeError::DivisionByZero),
            Some((a, b)) => Ok(Value::Float(a / b)),
            None => double_pair(l, r).map(|(a, b)| Value::Double(a / b)),
        },
    }
}

pub fn rem(l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    match (l, r) {
        (Value::Int(_), Value::Int(0)) => Err(RuntimeError::ModuloByZero),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_rem(*b))),
        _ => match float_pair(l, r) {
            Some((_, b)) if b == 0.0 => Err(RuntimeError::ModuloByZero),
            Some((a, b)) => Ok(Value::Float(a % b)),
            None => double_pair(l, r).map(|(a, b)| Value::Double(a % b)),
        },
    }
}

/// Relational operators always compare as doubles.
pub fn compare(op: BinOp, l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    let (a, b) = double_pair(l, r)?;
    let result = match op {
        BinOp::Lt => a < b,
        BinOp::Gt => a > b,
        BinOp::Lte => a <= b,
        BinOp::Gte => a >= b,
        other => {
            return Err(RuntimeError::Internal(format!(
                "{:?} is not a relational operator",
                other
            )))
        }
    };
    Ok(Value::Bool(result))
}

pub fn arithmetic(op: BinOp, l: &Value, r: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => add(l, r),
        BinOp::Sub => sub(l, r),
        BinOp::Mul => mul(l, r),
        BinOp::Div => div(l, r),
        BinOp::Mod => rem(l, r),
        other => Err(RuntimeError::Internal(format!(
            "{:?} is not an arithmetic operator",
            other
        ))),
    }
}

/// Unary `-` and `+`.
pub fn unary(op: UnaryOp, v: &Value) -> Result<Value, RuntimeError> {
    match (op, v) {
        (UnaryOp::Neg, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOp::Plus, Value::Int(_) | Value::Float(_) | Value::Double(_)) => Ok(v.clone()),
        (_, Value::Void) => Err(RuntimeError::VoidUsage),
        (_, other) => Err(RuntimeError::Type(format!(
            "Incompatible type for unary operation: {}",
            other.type_name()
        ))),
    }
}

/// Type-preserving `++`/`--` step.
pub fn step(op: StepOp, v: &Value) -> Result<Value, RuntimeError> {
    let delta: i32 = match op {
        StepOp::Inc => 1,
        StepOp::Dec => -1,
    };
    match v {
        Value::Int(i) => Ok(Value::Int(i.wrapping_add(delta))),
        Value::Float(f) => Ok(Value::Float(f + delta as f32)),
        Value::Double(d) => Ok(Value::Double(d + delta as f64)),
        Value::Char(c) => Ok(wrap_char(*c as i32 + delta)),
        other => Err(RuntimeError::Type(format!(
            "Increment and decrement apply only to numeric or char values, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arithmetic_wraps() {
        assert_eq!(add(&Value::Int(i32::MAX), &Value::Int(1)).unwrap(), Value::Int(i32::MIN));
        assert_eq!(mul(&Value::Int(6), &Value::Int(7)).unwrap(), Value::Int(42));
        assert_eq!(div(&Value::Int(7), &Value::Int(2)).unwrap(), Value::Int(3));
        assert_eq!(rem(&Value::Int(-7), &Value::Int(3)).unwrap(), Value::Int(-1));
    }

    #[test]
    fn int_and_float_zero_divisors_fail() {
        assert_eq!(div(&Value::Int(1), &Value::Int(0)), Err(RuntimeError::DivisionByZero));
        assert_eq!(rem(&Value::Int(1), &Value::Int(0)), Err(RuntimeError::ModuloByZero));
        assert_eq!(div(&Value::Float(1.0), &Value::Int(0)), Err(RuntimeError::DivisionByZero));
    }

    #[test]
    fn double_zero_divisor_follows_ieee() {
        let v = div(&Value::Double(1.0), &Value::Double(0.0)).unwrap();
        assert_eq!(v, Value::Double(f64::INFINITY));
        let v = div(&Value::Char(0), &Value::Double(0.0)).unwrap();
        assert!(matches!(v, Value::Double(d) if d.is_nan()));
    }

    #[test]
    fn char_promotion() {
        assert_eq!(add(&Value::Char(65), &Value::Int(1)).unwrap(), Value::Char(66));
        assert_eq!(add(&Value::Int(1), &Value::Char(65)).unwrap(), Value::Char(66));
        assert_eq!(sub(&Value::Char(67), &Value::Char(65)).unwrap(), Value::Int(2));
        assert_eq!(add(&Value::Char(u16::MAX), &Value::Int(1)).unwrap(), Value::Char(0));
    }

    #[test]
    fn mixed_float_and_char_widens_to_double() {
        assert_eq!(add(&Value::Int(1), &Value::Float(0.5)).unwrap(), Value::Float(1.5));
        assert_eq!(add(&Value::Char(1), &Value::Float(0.5)).unwrap(), Value::Double(1.5));
    }

    #[test]
    fn comparisons_promote_to_double() {
        assert_eq!(compare(BinOp::Lt, &Value::Char(65), &Value::Float(65.5)).unwrap(), Value::Bool(true));
        assert!(compare(BinOp::Lt, &Value::Bool(true), &Value::Int(1)).is_err());
    }

    #[test]
    fn step_preserves_type() {
        assert_eq!(step(StepOp::Inc, &Value::Char(97)).unwrap(), Value::Char(98));
        assert_eq!(step(StepOp::Dec, &Value::Float(1.5)).unwrap(), Value::Float(0.5));
        assert!(step(StepOp::Inc, &Value::Bool(true)).is_err());
    }
}
