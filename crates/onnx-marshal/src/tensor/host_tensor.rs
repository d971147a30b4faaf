//! Host-side tensor pairing a flat buffer with its shape, as handed to the runtime.

use super::{data::TensorData, dtype::ElementType, shape::Shape};
use crate::error::{LeafPath, MarshalError, Result};
use crate::value::{TypedArray, Value};

/// Dense tensor ready to be passed to an inference session.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: TensorData,
}

impl Tensor {
    /// Pairs `data` with `shape`, validating the element count (or byte length for raw
    /// payloads) against the shape.
    pub fn new(shape: Shape, data: TensorData) -> Result<Self> {
        let expected = shape.checked_num_elements().ok_or_else(|| {
            MarshalError::InvalidShape(format!("element count of shape {shape} overflows"))
        })?;
        match &data {
            TensorData::Raw {
                element_type,
                bytes,
            } => {
                let width = element_type
                    .size_in_bytes()
                    .ok_or(MarshalError::UnsupportedElementType(*element_type))?;
                let expected_bytes = expected.checked_mul(width).ok_or_else(|| {
                    MarshalError::InvalidShape(format!("byte length of shape {shape} overflows"))
                })?;
                if bytes.len() != expected_bytes {
                    return Err(MarshalError::InvalidShape(format!(
                        "raw payload of {} bytes does not match shape {shape} of {element_type} ({expected_bytes} bytes)",
                        bytes.len()
                    )));
                }
            }
            other => {
                if other.len() != expected {
                    return Err(MarshalError::InvalidShape(format!(
                        "tensor data length ({}) does not match shape {shape}",
                        other.len()
                    )));
                }
            }
        }
        Ok(Tensor { shape, data })
    }

    /// Rank-0 tensor from a script scalar (`LONG`, `DOUBLE` or `STRING`).
    pub fn from_scalar(value: &Value) -> Result<Self> {
        let data = match value {
            Value::I64(v) => TensorData::I64(vec![*v]),
            Value::F64(v) => TensorData::F64(vec![*v]),
            Value::String(s) => TensorData::String(vec![s.clone()]),
            other => return Err(MarshalError::UnsupportedLeafType(other.kind_name())),
        };
        Tensor::new(Shape::scalar(), data)
    }

    /// Builds a tensor from an inferred array, deriving the shape from its nesting.
    ///
    /// Jagged arrays, arrays whose leaves disagree on their kind, and arrays with no
    /// element to infer a kind from are rejected.
    pub fn from_array(array: &TypedArray) -> Result<Self> {
        let mut leaves = Vec::new();
        let mut path = LeafPath::root();
        let dims = collect_leaves(array, &mut path, &mut leaves)?;
        let data = concat_leaves(&leaves)?;
        Tensor::new(Shape::from(dims), data)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    pub fn into_data(self) -> TensorData {
        self.data
    }

    /// Number of elements described by the shape.
    pub fn len(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_leaves<'a>(
    array: &'a TypedArray,
    path: &mut LeafPath,
    leaves: &mut Vec<(LeafPath, &'a TypedArray)>,
) -> Result<Vec<usize>> {
    match array {
        TypedArray::Empty => Err(MarshalError::InvalidShape(format!(
            "cannot infer the element type of the empty array at {path}"
        ))),
        TypedArray::Object(_) => Err(MarshalError::UnsupportedLeafType("object")),
        TypedArray::Nested(children) => {
            if children.is_empty() {
                return Err(MarshalError::InvalidShape(format!(
                    "cannot infer the element type of the empty array at {path}"
                )));
            }
            let mut inner: Option<Vec<usize>> = None;
            for (i, child) in children.iter().enumerate() {
                path.push(i);
                let dims = collect_leaves(child, path, leaves)?;
                match &inner {
                    Some(expected) if *expected != dims => {
                        let err = MarshalError::InvalidShape(format!(
                            "jagged array: {path} has dimensions {dims:?}, expected {expected:?}"
                        ));
                        return Err(err);
                    }
                    Some(_) => {}
                    None => inner = Some(dims),
                }
                path.pop();
            }
            let mut dims = vec![children.len()];
            dims.extend(inner.unwrap_or_default());
            Ok(dims)
        }
        leaf => {
            leaves.push((path.clone(), leaf));
            Ok(vec![leaf.len()])
        }
    }
}

macro_rules! concat_variant {
    ($leaves:expr, $variant:ident, $data:ident, $first:expr) => {{
        let mut out = Vec::new();
        for (path, leaf) in $leaves {
            match leaf {
                TypedArray::$variant(values) => out.extend(values.iter().cloned()),
                other => {
                    return Err(MarshalError::mismatch(
                        $first.element_kind(),
                        other.element_kind(),
                        path,
                    ))
                }
            }
        }
        TensorData::$data(out)
    }};
}

fn concat_leaves(leaves: &[(LeafPath, &TypedArray)]) -> Result<TensorData> {
    let Some((_, first)) = leaves.first() else {
        return Err(MarshalError::InvalidShape("array has no leaves".to_string()));
    };
    let data = match first {
        TypedArray::I8(_) => concat_variant!(leaves, I8, I8, first),
        TypedArray::I16(_) => concat_variant!(leaves, I16, I16, first),
        TypedArray::I32(_) => concat_variant!(leaves, I32, I32, first),
        TypedArray::I64(_) => concat_variant!(leaves, I64, I64, first),
        TypedArray::F32(_) => concat_variant!(leaves, F32, F32, first),
        TypedArray::F64(_) => concat_variant!(leaves, F64, F64, first),
        TypedArray::String(_) => concat_variant!(leaves, String, String, first),
        TypedArray::Bool(_) => {
            let mut out = Vec::new();
            for (path, leaf) in leaves {
                match leaf {
                    TypedArray::Bool(values) => out.extend(values.iter().map(|&b| u8::from(b))),
                    other => return Err(MarshalError::mismatch("bool", other.element_kind(), path)),
                }
            }
            TensorData::Bool(out)
        }
        TypedArray::Empty | TypedArray::Nested(_) | TypedArray::Object(_) => {
            return Err(MarshalError::UnsupportedLeafType(first.element_kind()))
        }
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Tensor::new(Shape::new(&[2, 2]), TensorData::F32(vec![1.0; 3]))
            .expect_err("3 elements cannot fill a 2x2 tensor");
        assert!(matches!(err, MarshalError::InvalidShape(_)));
    }

    #[test]
    fn raw_payload_is_checked_in_bytes() {
        let raw = TensorData::Raw {
            element_type: ElementType::Float32,
            bytes: vec![0; 8],
        };
        let tensor = Tensor::new(Shape::new(&[2]), raw.clone()).expect("8 bytes hold two f32");
        assert_eq!(tensor.element_type(), ElementType::Float32);
        assert!(Tensor::new(Shape::new(&[3]), raw).is_err());
    }

    #[test]
    fn raw_string_payload_is_unsupported() {
        let raw = TensorData::Raw {
            element_type: ElementType::String,
            bytes: vec![0; 4],
        };
        let err = Tensor::new(Shape::new(&[1]), raw).expect_err("strings have no width");
        assert_eq!(err, MarshalError::UnsupportedElementType(ElementType::String));
    }

    #[test]
    fn from_array_derives_rectangular_shape() {
        let array = TypedArray::Nested(vec![
            TypedArray::I64(vec![1, 2, 3]),
            TypedArray::I64(vec![4, 5, 6]),
        ]);
        let tensor = Tensor::from_array(&array).expect("rectangular array");
        assert_eq!(tensor.shape().dims(), &[2, 3]);
        assert_eq!(tensor.data(), &TensorData::I64(vec![1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn from_array_rejects_jagged_input() {
        let array = TypedArray::Nested(vec![
            TypedArray::I64(vec![1, 2, 3]),
            TypedArray::I64(vec![4, 5]),
        ]);
        let err = Tensor::from_array(&array).expect_err("jagged array");
        assert!(matches!(err, MarshalError::InvalidShape(msg) if msg.contains("jagged")));
    }

    #[test]
    fn from_array_rejects_mixed_leaf_kinds() {
        let array = TypedArray::Nested(vec![TypedArray::I64(vec![1]), TypedArray::F64(vec![1.0])]);
        let err = Tensor::from_array(&array).expect_err("mixed kinds");
        assert_eq!(
            err,
            MarshalError::TypeMismatch {
                expected: "i64",
                found: "f64",
                path: LeafPath::from(vec![1]),
            }
        );
    }

    #[test]
    fn scalar_tensor_has_rank_zero() {
        let tensor = Tensor::from_scalar(&Value::from("hello")).expect("string scalar");
        assert!(tensor.shape().is_scalar());
        assert_eq!(tensor.len(), 1);
        assert!(Tensor::from_scalar(&Value::Bool(true)).is_err());
    }
}
