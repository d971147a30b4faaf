//! Error type shared by the tensor builder, array inference and the canonicalizer.

use thiserror::Error;

use crate::tensor::ElementType;

/// Failures raised while marshalling script values into tensors or runtime values back out.
///
/// Every variant describes a problem with the input itself; none of them are transient.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarshalError {
    #[error("invalid element type '{0}', expected one of: {list}", list = ElementType::tag_list())]
    InvalidTypeTag(String),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        path: LeafPath,
    },

    #[error("element type {0} has no construction rule")]
    UnsupportedElementType(ElementType),

    #[error("cannot convert {0} to an ONNX tensor")]
    UnsupportedLeafType(&'static str),

    #[error("unsupported value type {0}")]
    UnsupportedValueType(String),
}

impl MarshalError {
    pub(crate) fn mismatch(expected: &'static str, found: &'static str, path: &LeafPath) -> Self {
        MarshalError::TypeMismatch {
            expected,
            found,
            path: path.clone(),
        }
    }
}

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, MarshalError>;

/// Index path from the payload root down to a leaf, e.g. `[1][0][2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafPath(Vec<usize>);

impl LeafPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl From<Vec<usize>> for LeafPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl std::fmt::Display for LeafPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for index in &self.0 {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}
