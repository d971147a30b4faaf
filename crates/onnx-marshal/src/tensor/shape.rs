//! Row-major tensor shape bookkeeping.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{MarshalError, Result};

/// Logical dimensions of a tensor, outermost axis first.
///
/// A rank-0 shape describes a scalar and holds exactly one element.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct Shape {
    dims: SmallVec<[usize; 4]>,
}

impl Shape {
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: SmallVec::from_slice(dims),
        }
    }

    pub fn scalar() -> Self {
        Self {
            dims: SmallVec::new(),
        }
    }

    /// Builds a shape from script-provided extents, rejecting negative entries.
    pub fn from_signed(dims: &[i64]) -> Result<Self> {
        let mut out = SmallVec::with_capacity(dims.len());
        for (pos, &dim) in dims.iter().enumerate() {
            let extent = usize::try_from(dim).map_err(|_| {
                MarshalError::InvalidShape(format!("dimension {dim} at position {pos} is negative"))
            })?;
            out.push(extent);
        }
        Ok(Self { dims: out })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Total element count, `None` on overflow.
    pub fn checked_num_elements(&self) -> Option<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    /// Total element count implied by the dimensions.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Dimensions as the signed extents the runtime expects.
    pub fn to_signed(&self) -> Vec<i64> {
        self.dims.iter().map(|&dim| dim as i64).collect()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims.as_slice())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape {
            dims: SmallVec::from_vec(dims),
        }
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl From<Shape> for Vec<usize> {
    fn from(shape: Shape) -> Self {
        shape.dims.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_shape_holds_one_element() {
        let shape = Shape::scalar();
        assert!(shape.is_scalar());
        assert_eq!(shape.num_elements(), 1);
    }

    #[test]
    fn negative_extent_is_rejected_with_position() {
        let err = Shape::from_signed(&[2, -1, 3]).expect_err("negative extent must fail");
        match err {
            MarshalError::InvalidShape(msg) => assert!(msg.contains("position 1"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_extent_is_allowed() {
        let shape = Shape::from_signed(&[0, 4]).expect("zero extent is valid");
        assert_eq!(shape.num_elements(), 0);
        assert_eq!(shape.to_signed(), vec![0, 4]);
    }

    #[test]
    fn overflowing_product_is_reported() {
        let shape = Shape::new(&[usize::MAX, 2]);
        assert_eq!(shape.checked_num_elements(), None);
    }

    #[test]
    fn serializes_as_plain_list() {
        let shape = Shape::new(&[2, 3]);
        let json = serde_json::to_string(&shape).unwrap();
        assert_eq!(json, "[2,3]");
        let back: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, shape);
        assert_eq!(back.to_string(), "[2 3]");
    }
}
