//! Canonicalization of runtime values into the host's value model.
//!
//! Integers of every width become `I64`, floats become `F64`, arrays become sequences.
//! Mappings are the exception: only their direct `F32` values are widened, and a mapping
//! without any `F32` value is returned untouched. Values nested inside a mapping entry are
//! not revisited; callers needing full depth pass extracted entries back through
//! [`canonicalize`].

use crate::error::{MarshalError, Result};
use crate::value::{Mapping, TypedArray, Value};

/// Normalizes `value` into the canonical value model.
///
/// Fails with [`MarshalError::UnsupportedValueType`] on opaque runtime values; no partial
/// result is returned in that case.
pub fn canonicalize(value: Value) -> Result<Value> {
    match value {
        Value::Mapping(map) => Ok(Value::Mapping(widen_mapping(map))),
        Value::Sequence(items) => items
            .into_iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        v @ (Value::I64(_) | Value::F64(_) | Value::String(_) | Value::Bool(_)) => Ok(v),
        Value::I32(v) => Ok(Value::I64(i64::from(v))),
        Value::I16(v) => Ok(Value::I64(i64::from(v))),
        Value::I8(v) => Ok(Value::I64(i64::from(v))),
        Value::F32(v) => Ok(Value::F64(f64::from(v))),
        // Bytes are signed, like any other 8-bit array.
        Value::Bytes(bytes) => Ok(Value::Sequence(
            bytes
                .into_iter()
                .map(|b| Value::I64(i64::from(b as i8)))
                .collect(),
        )),
        Value::Array(array) => canonicalize_array(array),
        Value::Opaque(type_name) => Err(MarshalError::UnsupportedValueType(type_name)),
    }
}

fn widen_mapping(map: Mapping) -> Mapping {
    if !map.values().any(|v| matches!(v, Value::F32(_))) {
        return map;
    }
    let mut widened = Mapping::with_capacity(map.len());
    for (key, value) in map {
        let value = match value {
            Value::F32(v) => Value::F64(f64::from(v)),
            other => other,
        };
        widened.insert(key, value);
    }
    widened
}

fn canonicalize_array(array: TypedArray) -> Result<Value> {
    let items = match array {
        TypedArray::Empty => Vec::new(),
        TypedArray::Bool(v) => v.into_iter().map(Value::Bool).collect(),
        TypedArray::I8(v) => v.into_iter().map(|x| Value::I64(i64::from(x))).collect(),
        TypedArray::I16(v) => v.into_iter().map(|x| Value::I64(i64::from(x))).collect(),
        TypedArray::I32(v) => v.into_iter().map(|x| Value::I64(i64::from(x))).collect(),
        TypedArray::I64(v) => v.into_iter().map(Value::I64).collect(),
        TypedArray::F32(v) => v.into_iter().map(|x| Value::F64(f64::from(x))).collect(),
        TypedArray::F64(v) => v.into_iter().map(Value::F64).collect(),
        TypedArray::String(v) => v.into_iter().map(Value::String).collect(),
        TypedArray::Nested(children) => children
            .into_iter()
            .map(canonicalize_array)
            .collect::<Result<Vec<_>>>()?,
        TypedArray::Object(values) => values
            .into_iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(Value::Sequence(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_scalars_are_widened() {
        assert_eq!(canonicalize(Value::I8(-2)).unwrap(), Value::I64(-2));
        assert_eq!(canonicalize(Value::I16(300)).unwrap(), Value::I64(300));
        assert_eq!(canonicalize(Value::I32(-70_000)).unwrap(), Value::I64(-70_000));
        assert_eq!(canonicalize(Value::F32(0.25)).unwrap(), Value::F64(0.25));
    }

    #[test]
    fn bytes_read_back_as_signed_longs() {
        let out = canonicalize(Value::Bytes(vec![1, 0xff])).unwrap();
        assert_eq!(out, Value::Sequence(vec![Value::I64(1), Value::I64(-1)]));
    }

    #[test]
    fn nested_arrays_become_nested_sequences() {
        let array = TypedArray::Nested(vec![TypedArray::F32(vec![1.5]), TypedArray::Empty]);
        let out = canonicalize(Value::Array(array)).unwrap();
        assert_eq!(
            out,
            Value::Sequence(vec![
                Value::Sequence(vec![Value::F64(1.5)]),
                Value::Sequence(vec![]),
            ])
        );
    }

    #[test]
    fn mapping_widening_is_one_level_deep() {
        let inner: Mapping = [("x", Value::F32(1.0))].into_iter().collect();
        let map: Mapping = [
            ("a", Value::F32(2.0)),
            ("b", Value::I32(3)),
            ("c", Value::Mapping(inner.clone())),
        ]
        .into_iter()
        .collect();
        let Value::Mapping(out) = canonicalize(Value::Mapping(map)).unwrap() else {
            panic!("mapping expected");
        };
        assert_eq!(out.get(&"a".into()), Some(&Value::F64(2.0)));
        assert_eq!(out.get(&"b".into()), Some(&Value::I32(3)));
        assert_eq!(out.get(&"c".into()), Some(&Value::Mapping(inner)));
    }

    #[test]
    fn opaque_value_inside_sequence_fails_whole_call() {
        let value = Value::Sequence(vec![Value::I64(1), Value::Opaque("OnnxOpaque".into())]);
        let err = canonicalize(value).expect_err("opaque element");
        assert_eq!(err, MarshalError::UnsupportedValueType("OnnxOpaque".into()));
    }
}
