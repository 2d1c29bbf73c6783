use super::*;

const MAX_RANK: usize = 3;

impl Interpreter {
    /// `array[indices] = value`. The value is evaluated first, then the
    /// array, then the indices.
    pub(super) fn assign_element(
        &mut self,
        array: &Expr,
        indices: &[Expr],
        value: Value,
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(array, frame)?;
        let indices = self.eval_indices(indices, frame)?;
        place.ensure_writable()?;
        self.with_place_mut(&place, frame, |slot| match slot {
            Value::Array(arr) => {
                let offset = arr.offset(&indices)?;
                let stored = types::coerce(&TypeRef::scalar(arr.elem.clone()), value)?;
                arr.data[offset] = stored.clone();
                Ok(stored)
            }
            other => Err(RuntimeError::NotIndexable(other.type_name().to_string())),
        })
    }

    /// `{a, b, c}`. The first element fixes the element type; nested
    /// literals build higher ranks.
    pub(super) fn eval_array_literal(&mut self, items: &[Expr], frame: &Frame) -> Result<Value, RuntimeError> {
        let values = self.eval_args(items, frame)?;
        array_from_values(values, &self.heap).map(Value::Array)
    }

    /// `new T[d1, d2, d3]`, every element defaulted.
    pub(super) fn eval_array_new(
        &mut self,
        elem: &TypeName,
        dims: &[Expr],
        frame: &Frame,
    ) -> Result<Value, RuntimeError> {
        if *elem == TypeName::Void {
            return Err(RuntimeError::Type("Cannot create an array of void".to_string()));
        }
        if dims.is_empty() || dims.len() > MAX_RANK {
            return Err(RuntimeError::Type(format!(
                "Arrays with {} dimensions are not supported",
                dims.len()
            )));
        }
        let mut sizes = Vec::with_capacity(dims.len());
        for dim in dims {
            match self.eval(dim, frame)? {
                Value::Int(n) if n < 0 => {
                    return Err(RuntimeError::Type("Array dimension cannot be negative".to_string()))
                }
                Value::Int(n) => sizes.push(n as usize),
                _ => return Err(RuntimeError::Type("Array dimension must be an integer".to_string())),
            }
        }
        let too_large = || RuntimeError::Type("Array too large".to_string());
        let len = sizes
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<Value>())
            .ok_or_else(too_large)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| too_large())?;
        data.resize(len, types::element_default(elem));
        Ok(Value::Array(ArrayValue {
            elem: elem.clone(),
            dims: sizes,
            data,
        }))
    }
}

fn element_type(value: &Value, heap: &HeapManager) -> Result<TypeName, RuntimeError> {
    match value {
        Value::Int(_) => Ok(TypeName::Int),
        Value::Float(_) | Value::Double(_) => Ok(TypeName::Float),
        Value::Char(_) => Ok(TypeName::Char),
        Value::Bool(_) => Ok(TypeName::Bool),
        Value::Str(_) => Ok(TypeName::Str),
        Value::Struct(s) => Ok(TypeName::Named(s.def.name.clone())),
        Value::Object(r) => match heap.get(*r) {
            Some(HeapObject::Instance(inst)) => Ok(TypeName::Named(inst.def.name.clone())),
            _ => Err(RuntimeError::DanglingReference),
        },
        Value::Void => Err(RuntimeError::VoidUsage),
        other => Err(RuntimeError::Type(format!(
            "Unsupported array element type: {}",
            other.type_name()
        ))),
    }
}

fn array_from_values(values: Vec<Value>, heap: &HeapManager) -> Result<ArrayValue, RuntimeError> {
    let Some(first) = values.first() else {
        return Ok(ArrayValue {
            elem: TypeName::Int,
            dims: vec![0],
            data: Vec::new(),
        });
    };

    if let Value::Array(first_row) = first {
        let inner_dims = first_row.dims.clone();
        let elem = first_row.elem.clone();
        if inner_dims.len() + 1 > MAX_RANK {
            return Err(RuntimeError::Type(format!(
                "Arrays support at most {} dimensions",
                MAX_RANK
            )));
        }
        let mut dims = vec![values.len()];
        dims.extend(&inner_dims);
        let mut data = Vec::with_capacity(dims.iter().product());
        for row in values {
            match row {
                Value::Array(row) if row.dims == inner_dims => {
                    let target = TypeRef::scalar(elem.clone());
                    for v in row.data {
                        data.push(if row.elem == elem { v } else { types::coerce(&target, v)? });
                    }
                }
                _ => {
                    return Err(RuntimeError::Type(
                        "All rows in multi-dimensional array must have same length".to_string(),
                    ))
                }
            }
        }
        return Ok(ArrayValue { elem, dims, data });
    }

    let elem = element_type(first, heap)?;
    let target = TypeRef::scalar(elem.clone());
    let data = values
        .into_iter()
        .map(|v| types::coerce(&target, v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ArrayValue {
        elem,
        dims: vec![data.len()],
        data,
    })
}
