//! Array inference: script lists to homogeneous typed arrays, without an explicit type.
//!
//! At each nesting level only the first element is inspected; it picks the array kind for
//! all of its siblings. Nested lists are inferred child by child, so siblings may end up
//! with different kinds or lengths. Rejecting such arrays is left to the tensor
//! constructor ([`crate::Tensor::from_array`]).

use crate::error::{LeafPath, MarshalError, Result};
use crate::value::{TypedArray, Value};

/// Infers a typed array from a (possibly nested) script list.
pub fn infer_array(list: &[Value]) -> Result<TypedArray> {
    let mut path = LeafPath::root();
    infer_level(list, &mut path)
}

fn infer_level(list: &[Value], path: &mut LeafPath) -> Result<TypedArray> {
    let Some(first) = list.first() else {
        return Ok(TypedArray::Empty);
    };

    match first {
        Value::I64(_) => collect(list, path, "i64", |v| v.as_i64()).map(TypedArray::I64),
        Value::F64(_) => collect(list, path, "f64", |v| match v {
            Value::F64(x) => Some(*x),
            _ => None,
        })
        .map(TypedArray::F64),
        Value::String(_) => collect(list, path, "string", |v| v.as_str().map(str::to_string))
            .map(TypedArray::String),
        Value::Sequence(_) => {
            let mut children = Vec::with_capacity(list.len());
            for (i, item) in list.iter().enumerate() {
                path.push(i);
                let child = match item {
                    Value::Sequence(inner) => infer_level(inner, path)?,
                    other => {
                        return Err(MarshalError::mismatch("sequence", other.kind_name(), path))
                    }
                };
                path.pop();
                children.push(child);
            }
            Ok(TypedArray::Nested(children))
        }
        other => Err(MarshalError::UnsupportedLeafType(other.kind_name())),
    }
}

fn collect<T>(
    list: &[Value],
    path: &mut LeafPath,
    expected: &'static str,
    read: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(list.len());
    for (i, item) in list.iter().enumerate() {
        match read(item) {
            Some(v) => out.push(v),
            None => {
                path.push(i);
                return Err(MarshalError::mismatch(expected, item.kind_name(), path));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_explicitly_empty() {
        assert_eq!(infer_array(&[]).unwrap(), TypedArray::Empty);
    }

    #[test]
    fn first_element_decides_for_all_siblings() {
        let err = infer_array(&[Value::I64(1), Value::F64(2.0)]).expect_err("double after long");
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
    fn nested_children_are_typed_independently() {
        let list = vec![
            Value::Sequence(vec![Value::I64(1)]),
            Value::Sequence(vec![Value::from("a"), Value::from("b")]),
        ];
        let array = infer_array(&list).expect("independent children");
        assert_eq!(
            array,
            TypedArray::Nested(vec![
                TypedArray::I64(vec![1]),
                TypedArray::String(vec!["a".into(), "b".into()]),
            ])
        );
    }

    #[test]
    fn booleans_cannot_be_inferred() {
        let err = infer_array(&[Value::Bool(true)]).expect_err("no rule for booleans");
        assert_eq!(err, MarshalError::UnsupportedLeafType("bool"));
    }

    #[test]
    fn scalar_among_nested_siblings_is_a_mismatch() {
        let list = vec![Value::Sequence(vec![Value::I64(1)]), Value::I64(2)];
        let err = infer_array(&list).expect_err("scalar where a list is expected");
        assert!(matches!(
            err,
            MarshalError::TypeMismatch { expected: "sequence", found: "i64", .. }
        ));
    }
}
