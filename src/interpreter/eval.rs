use super::*;

impl Interpreter {
    pub(super) fn eval(&mut self, expr: &Expr, frame: &Frame) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(self.eval_literal(lit)),
            Expr::Variable(name) => frame.env.get(name),
            Expr::Grouping(inner) => self.eval(inner, frame),

            Expr::Binary(op, left, right) => {
                let l = self.eval(left, frame)?;
                let r = self.eval(right, frame)?;
                self.eval_binop(*op, &l, &r)
            }

            Expr::Unary(op @ (UnaryOp::Inc | UnaryOp::Dec), target) => {
                let step = if *op == UnaryOp::Inc {
                    StepOp::Inc
                } else {
                    StepOp::Dec
                };
                let (_, new) = self.step_place(step, target, frame)?;
                Ok(new)
            }
            Expr::Unary(op, operand) => {
                let v = self.eval(operand, frame)?;
                numeric::unary(*op, &v)
            }
            Expr::Postfix(step, target) => {
                let (old, _) = self.step_place(*step, target, frame)?;
                Ok(old)
            }

            Expr::Assign(name, value) => {
                let value = self.eval(value, frame)?;
                if let Value::Void = value {
                    return Err(RuntimeError::VoidUsage);
                }
                frame.env.with_value_mut(name, |slot| -> Result<Value, RuntimeError> {
                    *slot = types::coerce_like(slot, value)?;
                    Ok(slot.clone())
                })?
            }
            Expr::MemberAssign(object, field, value) => {
                let value = self.eval(value, frame)?;
                self.assign_member(object, field, value, frame)
            }
            Expr::ArrayAssign(array, indices, value) => {
                let value = self.eval(value, frame)?;
                self.assign_element(array, indices, value, frame)
            }

            Expr::Call(callee, args) => self.eval_call(callee, args, frame),
            Expr::MemberAccess(object, name) => {
                let object = self.eval(object, frame)?;
                self.get_member(object, name)
            }
            Expr::StructNew(name, args) => self.eval_struct_new(name, args, frame),
            Expr::ClassNew(name, args) => self.eval_class_new(name, args, frame),

            Expr::ArrayAccess(..) => {
                let place = self.resolve_place(expr, frame)?;
                self.read_place(&place, frame)
            }
            Expr::ArrayLiteral(items) => self.eval_array_literal(items, frame),
            Expr::ArrayNew(elem, dims) => self.eval_array_new(elem, dims, frame),
        }
    }

    fn eval_literal(&mut self, lit: &Literal) -> Value {
        match lit {
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Char(c) => Value::Char(*c),
            Literal::Bool(b) => Value::Bool(*b),
            // Every evaluation yields a distinct string object.
            Literal::Str(s) => self.heap.alloc_string(s.as_str()),
            Literal::Null => Value::Null,
        }
    }

    pub(super) fn eval_args(&mut self, args: &[Expr], frame: &Frame) -> Result<Vec<Value>, RuntimeError> {
        args.iter().map(|arg| self.eval(arg, frame)).collect()
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], frame: &Frame) -> Result<Value, RuntimeError> {
        if let Expr::MemberAccess(object, name) = callee {
            return self.call_member(object, name, args, frame);
        }
        let callee = self.eval(callee, frame)?;
        let args = self.eval_args(args, frame)?;
        self.call_value(callee, args, frame)
    }
}
