//! Storage locations denoted by assignment targets.
//!
//! Arrays and structs are values, so writing `a[i].f = v` has to reach the
//! array that lives in the variable `a` rather than a copy of it. A place
//! is a root (a variable, a class instance on the heap, or a temporary)
//! plus the field and index steps leading from it to the target slot.
use super::*;

pub(super) enum PlaceRoot {
    Var(String),
    Object(ObjectRef),
    /// Result of an arbitrary expression; writes into it are discarded.
    Temp(Value),
    /// A module export. Readable, never assignable.
    Export(Value),
}

pub(super) enum PlaceStep {
    Field(String),
    Index(Vec<i32>),
}

pub(super) struct Place {
    root: PlaceRoot,
    steps: Vec<PlaceStep>,
}

impl Place {
    /// Assignments through a module namespace are rejected.
    pub(super) fn ensure_writable(&self) -> Result<(), RuntimeError> {
        match self.root {
            PlaceRoot::Export(_) => Err(RuntimeError::InvalidAssignmentTarget(
                "Cannot assign to a module export".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn push(mut self, step: PlaceStep) -> Place {
        self.steps.push(step);
        self
    }
}

impl Interpreter {
    /// Evaluates the index expressions along the way, left to right.
    pub(super) fn resolve_place(&mut self, expr: &Expr, frame: &Frame) -> Result<Place, RuntimeError> {
        match expr {
            Expr::Variable(name) => Ok(Place {
                root: PlaceRoot::Var(name.clone()),
                steps: Vec::new(),
            }),
            Expr::Grouping(inner) => self.resolve_place(inner, frame),
            Expr::ArrayAccess(array, indices) => {
                let place = self.resolve_place(array, frame)?;
                let indices = self.eval_indices(indices, frame)?;
                Ok(place.push(PlaceStep::Index(indices)))
            }
            Expr::MemberAccess(object, field) => {
                let place = self.resolve_place(object, frame)?;
                self.member_place(place, field, frame)
            }
            other => Ok(Place {
                root: PlaceRoot::Temp(self.eval(other, frame)?),
                steps: Vec::new(),
            }),
        }
    }

    /// Extend `place` with a field step. A class instance re-roots the
    /// place at the heap; a module namespace yields the export itself.
    pub(super) fn member_place(
        &mut self,
        place: Place,
        field: &str,
        frame: &Frame,
    ) -> Result<Place, RuntimeError> {
        let rerooted = self.with_place_mut(&place, frame, |v| match v {
            Value::Object(r) => Ok(Some(Place {
                root: PlaceRoot::Object(*r),
                steps: vec![PlaceStep::Field(field.to_string())],
            })),
            Value::Module(exports) => match exports.get(field) {
                Some(export) => Ok(Some(Place {
                    root: PlaceRoot::Export(export.clone()),
                    steps: Vec::new(),
                })),
                None => Err(RuntimeError::MemberNotFound(format!(
                    "Module does not export '{}'",
                    field
                ))),
            },
            _ => Ok(None),
        })?;
        Ok(match rerooted {
            Some(rerooted) => rerooted,
            None => place.push(PlaceStep::Field(field.to_string())),
        })
    }

    pub(super) fn eval_indices(&mut self, indices: &[Expr], frame: &Frame) -> Result<Vec<i32>, RuntimeError> {
        indices
            .iter()
            .map(|index| match self.eval(index, frame)? {
                Value::Int(i) => Ok(i),
                Value::Void => Err(RuntimeError::VoidUsage),
                other => Err(RuntimeError::Type(format!(
                    "Array index must be an integer, got {}",
                    other.type_name()
                ))),
            })
            .collect()
    }

    pub(super) fn read_place(&mut self, place: &Place, frame: &Frame) -> Result<Value, RuntimeError> {
        self.with_place_mut(place, frame, |v| Ok(v.clone()))
    }

    /// Run `f` on the slot `place` denotes.
    pub(super) fn with_place_mut<R>(
        &mut self,
        place: &Place,
        frame: &Frame,
        f: impl FnOnce(&mut Value) -> Result<R, RuntimeError>,
    ) -> Result<R, RuntimeError> {
        match &place.root {
            PlaceRoot::Var(name) => frame
                .env
                .with_value_mut(name, |v| walk(v, &place.steps, f))?,
            PlaceRoot::Object(r) => {
                let Some((PlaceStep::Field(name), rest)) = place.steps.split_first() else {
                    return Err(RuntimeError::Internal("heap place without a field".to_string()));
                };
                match self.heap.get_mut(*r) {
                    Some(HeapObject::Instance(inst)) => {
                        let class = inst.def.name.clone();
                        let slot = inst.fields.get_mut(name).ok_or_else(|| {
                            RuntimeError::MemberNotFound(format!(
                                "Class '{}' has no field '{}'",
                                class, name
                            ))
                        })?;
                        walk(slot, rest, f)
                    }
                    Some(HeapObject::Str(_)) => Err(RuntimeError::Type(format!(
                        "Cannot access field '{}' of a string",
                        name
                    ))),
                    None => Err(RuntimeError::DanglingReference),
                }
            }
            PlaceRoot::Temp(value) | PlaceRoot::Export(value) => {
                let mut value = value.clone();
                walk(&mut value, &place.steps, f)
            }
        }
    }

    /// `++`/`--` on a variable or array element. Returns (old, new).
    pub(super) fn step_place(
        &mut self,
        op: StepOp,
        target: &Expr,
        frame: &Frame,
    ) -> Result<(Value, Value), RuntimeError> {
        if !matches!(target, Expr::Variable(_) | Expr::ArrayAccess(..)) {
            return Err(RuntimeError::InvalidAssignmentTarget(
                "Operand of ++/-- must be a variable or array element".to_string(),
            ));
        }
        let place = self.resolve_place(target, frame)?;
        place.ensure_writable()?;
        self.with_place_mut(&place, frame, |slot| {
            let new = numeric::step(op, slot)?;
            let old = std::mem::replace(slot, new.clone());
            Ok((old, new))
        })
    }
}

fn walk<R>(
    value: &mut Value,
    steps: &[PlaceStep],
    f: impl FnOnce(&mut Value) -> Result<R, RuntimeError>,
) -> Result<R, RuntimeError> {
    let Some((step, rest)) = steps.split_first() else {
        return f(value);
    };
    match (step, value) {
        (PlaceStep::Field(name), Value::Struct(s)) => {
            let type_name = s.def.name.clone();
            let slot = s.fields.get_mut(name).ok_or_else(|| {
                RuntimeError::MemberNotFound(format!(
                    "Struct '{}' has no field '{}'",
                    type_name, name
                ))
            })?;
            walk(slot, rest, f)
        }
        (PlaceStep::Field(name), Value::Null) => Err(RuntimeError::Type(format!(
            "Cannot access field '{}' of null",
            name
        ))),
        (PlaceStep::Field(name), other) => Err(RuntimeError::InvalidAssignmentTarget(format!(
            "Cannot assign field '{}' of a {}",
            name,
            other.type_name()
        ))),
        (PlaceStep::Index(indices), Value::Array(arr)) => {
            let offset = arr.offset(indices)?;
            walk(&mut arr.data[offset], rest, f)
        }
        (PlaceStep::Index(_), other) => {
            Err(RuntimeError::NotIndexable(other.type_name().to_string()))
        }
    }
}
