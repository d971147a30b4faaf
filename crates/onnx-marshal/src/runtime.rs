//! Values as returned by an inference session, and their conversion to the host model.

use std::fmt;

use crate::canonical::canonicalize;
use crate::error::{MarshalError, Result};
use crate::value::{Mapping, Value};

/// Kind tag of a runtime value, named after the runtime's own enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnnxValueType {
    Tensor,
    SparseTensor,
    Sequence,
    Map,
    Opaque,
    Unknown,
}

impl OnnxValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            OnnxValueType::Tensor => "ONNX_TYPE_TENSOR",
            OnnxValueType::SparseTensor => "ONNX_TYPE_SPARSETENSOR",
            OnnxValueType::Sequence => "ONNX_TYPE_SEQUENCE",
            OnnxValueType::Map => "ONNX_TYPE_MAP",
            OnnxValueType::Opaque => "ONNX_TYPE_OPAQUE",
            OnnxValueType::Unknown => "ONNX_TYPE_UNKNOWN",
        }
    }
}

impl fmt::Display for OnnxValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output value of an inference session, already read back into host memory.
///
/// Tensor contents are typically a [`Value::Array`] (possibly nested) or a boxed scalar
/// for rank-0 outputs.
#[derive(Debug, Clone, PartialEq)]
pub enum OnnxValue {
    Tensor(Value),
    SparseTensor(Value),
    Sequence(Vec<Value>),
    Map(Mapping),
    Opaque,
    Unknown,
}

impl OnnxValue {
    pub fn value_type(&self) -> OnnxValueType {
        match self {
            OnnxValue::Tensor(_) => OnnxValueType::Tensor,
            OnnxValue::SparseTensor(_) => OnnxValueType::SparseTensor,
            OnnxValue::Sequence(_) => OnnxValueType::Sequence,
            OnnxValue::Map(_) => OnnxValueType::Map,
            OnnxValue::Opaque => OnnxValueType::Opaque,
            OnnxValue::Unknown => OnnxValueType::Unknown,
        }
    }
}

/// Converts a session output into the canonical value model.
///
/// Opaque and unknown outputs have no host representation and are rejected.
pub fn canonicalize_runtime_value(value: OnnxValue) -> Result<Value> {
    match value {
        OnnxValue::Map(map) => canonicalize(Value::Mapping(map)),
        OnnxValue::Sequence(items) => canonicalize(Value::Sequence(items)),
        OnnxValue::Tensor(contents) | OnnxValue::SparseTensor(contents) => canonicalize(contents),
        other => Err(MarshalError::UnsupportedValueType(
            other.value_type().as_str().to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypedArray;

    #[test]
    fn tensor_outputs_become_sequences() {
        let out = canonicalize_runtime_value(OnnxValue::Tensor(Value::Array(TypedArray::F32(
            vec![0.5, 1.0],
        ))))
        .unwrap();
        assert_eq!(out, Value::Sequence(vec![Value::F64(0.5), Value::F64(1.0)]));
    }

    #[test]
    fn opaque_outputs_are_rejected_with_type_name() {
        let err = canonicalize_runtime_value(OnnxValue::Opaque).expect_err("opaque");
        assert_eq!(
            err,
            MarshalError::UnsupportedValueType("ONNX_TYPE_OPAQUE".to_string())
        );
    }
}
