use super::*;

impl Interpreter {
    /// Both operands are already evaluated; `&&` and `||` do not short-circuit.
    pub(super) fn eval_binop(&self, op: BinOp, l: &Value, r: &Value) -> Result<Value, RuntimeError> {
        if matches!(l, Value::Void) || matches!(r, Value::Void) {
            return Err(RuntimeError::VoidUsage);
        }
        match op {
            BinOp::And => Ok(Value::Bool(l.is_truthy() && r.is_truthy())),
            BinOp::Or => Ok(Value::Bool(l.is_truthy() || r.is_truthy())),
            BinOp::Eq => Ok(Value::Bool(self.values_equal(l, r))),
            BinOp::Neq => Ok(Value::Bool(!self.values_equal(l, r))),
            BinOp::Lt | BinOp::Gt | BinOp::Lte | BinOp::Gte => numeric::compare(op, l, r),
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                numeric::arithmetic(op, l, r)
            }
        }
    }

    /// Structural equality. Operands of different runtime kinds are never
    /// equal, so `1 == 1.0` is false. Strings compare by content, class
    /// instances by identity.
    pub(super) fn values_equal(&self, l: &Value, r: &Value) -> bool {
        match (l, r) {
            (Value::Str(a), Value::Str(b)) => {
                a == b
                    || matches!(
                        (self.heap.string(*a), self.heap.string(*b)),
                        (Some(x), Some(y)) if x == y
                    )
            }
            (Value::Array(a), Value::Array(b)) => {
                a.dims == b.dims
                    && a.data.len() == b.data.len()
                    && a.data.iter().zip(&b.data).all(|(x, y)| self.values_equal(x, y))
            }
            (Value::Struct(a), Value::Struct(b)) => {
                a.def.name == b.def.name
                    && a.fields
                        .0
                        .iter()
                        .zip(&b.fields.0)
                        .all(|((_, x), (_, y))| self.values_equal(x, y))
            }
            _ => l == r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_compare_by_content() {
        let mut interp = Interpreter::new();
        let a = interp.heap_mut().alloc_string("hi");
        let b = interp.heap_mut().alloc_string("hi");
        assert_ne!(a, b);
        assert!(interp.values_equal(&a, &b));
    }

    #[test]
    fn mixed_numeric_kinds_are_unequal() {
        let interp = Interpreter::new();
        assert!(!interp.values_equal(&Value::Int(1), &Value::Float(1.0)));
        assert!(interp.values_equal(&Value::Null, &Value::Null));
        assert!(!interp.values_equal(&Value::Int(0), &Value::Null));
    }

    #[test]
    fn logical_ops_use_truthiness() {
        let interp = Interpreter::new();
        let v = interp
            .eval_binop(BinOp::And, &Value::Bool(true), &Value::Null)
            .unwrap();
        assert_eq!(v, Value::Bool(false));
        let v = interp
            .eval_binop(BinOp::Or, &Value::Null, &Value::Int(0))
            .unwrap();
        assert_eq!(v, Value::Bool(true));
    }
}
