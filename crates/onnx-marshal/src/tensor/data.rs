//! Flat, typed element buffers produced by the tensor builder.

use super::dtype::ElementType;

/// Row-major element buffer of a single [`ElementType`].
///
/// `UInt8` and `Int8` share the same byte width but keep distinct variants so the runtime
/// receives the declared signedness. `Bool` stores one byte per element (1 or 0).
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    F32(Vec<f32>),
    F64(Vec<f64>),
    U8(Vec<u8>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    Bool(Vec<u8>),
    String(Vec<String>),
    /// Bytes handed over verbatim, to be reinterpreted as `element_type` by the runtime.
    Raw {
        element_type: ElementType,
        bytes: Vec<u8>,
    },
}

impl TensorData {
    pub fn element_type(&self) -> ElementType {
        match self {
            TensorData::F32(_) => ElementType::Float32,
            TensorData::F64(_) => ElementType::Float64,
            TensorData::U8(_) => ElementType::UInt8,
            TensorData::I8(_) => ElementType::Int8,
            TensorData::I16(_) => ElementType::Int16,
            TensorData::I32(_) => ElementType::Int32,
            TensorData::I64(_) => ElementType::Int64,
            TensorData::Bool(_) => ElementType::Bool,
            TensorData::String(_) => ElementType::String,
            TensorData::Raw { element_type, .. } => *element_type,
        }
    }

    /// Number of elements in the buffer.
    ///
    /// For raw payloads this is the byte length divided by the element width, rounded down.
    pub fn len(&self) -> usize {
        match self {
            TensorData::F32(v) => v.len(),
            TensorData::F64(v) => v.len(),
            TensorData::U8(v) => v.len(),
            TensorData::I8(v) => v.len(),
            TensorData::I16(v) => v.len(),
            TensorData::I32(v) => v.len(),
            TensorData::I64(v) => v.len(),
            TensorData::Bool(v) => v.len(),
            TensorData::String(v) => v.len(),
            TensorData::Raw {
                element_type,
                bytes,
            } => match element_type.size_in_bytes() {
                Some(width) => bytes.len() / width,
                None => bytes.len(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Native-endian byte view of fixed-width buffers. `None` for string buffers.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TensorData::F32(v) => Some(bytemuck::cast_slice(v.as_slice())),
            TensorData::F64(v) => Some(bytemuck::cast_slice(v.as_slice())),
            TensorData::U8(v) => Some(v.as_slice()),
            TensorData::I8(v) => Some(bytemuck::cast_slice(v.as_slice())),
            TensorData::I16(v) => Some(bytemuck::cast_slice(v.as_slice())),
            TensorData::I32(v) => Some(bytemuck::cast_slice(v.as_slice())),
            TensorData::I64(v) => Some(bytemuck::cast_slice(v.as_slice())),
            TensorData::Bool(v) => Some(v.as_slice()),
            TensorData::String(_) => None,
            TensorData::Raw { bytes, .. } => Some(bytes.as_slice()),
        }
    }

    pub fn byte_len(&self) -> Option<usize> {
        self.as_bytes().map(<[u8]>::len)
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            TensorData::String(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}
