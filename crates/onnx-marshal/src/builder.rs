//! Tensor builder: nested script lists (or raw bytes) to flat typed buffers.
//!
//! Flattening is a depth-first, left-to-right walk over nested sequences. The requested
//! shape is *not* used to check the nesting: only the total number of leaves decides the
//! buffer size, and the shape is forwarded to the runtime as metadata. Callers passing a
//! jagged payload whose leaf count happens to match the shape get a buffer back; the
//! tensor constructor is the place that enforces the element count.

use log::trace;

use crate::error::{LeafPath, MarshalError, Result};
use crate::tensor::{ElementType, Shape, TensorData};
use crate::value::Value;

/// Data argument of the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Bytes reinterpreted verbatim as elements of the requested type.
    Bytes(Vec<u8>),
    /// Possibly nested list of leaves.
    Nested(Vec<Value>),
}

/// Counts the non-sequence leaves reachable from `items`.
pub fn flatten_size(items: &[Value]) -> usize {
    items
        .iter()
        .map(|item| match item {
            Value::Sequence(inner) => flatten_size(inner),
            _ => 1,
        })
        .sum()
}

/// Walks `items` depth-first and converts every leaf with `convert`.
///
/// `capacity` is the expected leaf count (see [`flatten_size`]); the first failing leaf
/// aborts the walk and its error is returned as is.
pub fn flatten_with<T, F>(items: &[Value], capacity: usize, mut convert: F) -> Result<Vec<T>>
where
    F: FnMut(&Value, &LeafPath) -> Result<T>,
{
    let mut out = Vec::with_capacity(capacity);
    let mut path = LeafPath::root();
    flatten_into(items, &mut path, &mut out, &mut convert)?;
    Ok(out)
}

fn flatten_into<T, F>(
    items: &[Value],
    path: &mut LeafPath,
    out: &mut Vec<T>,
    convert: &mut F,
) -> Result<()>
where
    F: FnMut(&Value, &LeafPath) -> Result<T>,
{
    for (i, item) in items.iter().enumerate() {
        path.push(i);
        match item {
            Value::Sequence(inner) => flatten_into(inner, path, out, convert)?,
            leaf => out.push(convert(leaf, path)?),
        }
        path.pop();
    }
    Ok(())
}

fn numeric_f32(value: &Value, path: &LeafPath) -> Result<f32> {
    value
        .as_f32()
        .ok_or_else(|| MarshalError::mismatch("number", value.kind_name(), path))
}

fn numeric_f64(value: &Value, path: &LeafPath) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| MarshalError::mismatch("number", value.kind_name(), path))
}

fn long(value: &Value, path: &LeafPath) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| MarshalError::mismatch("i64", value.kind_name(), path))
}

fn boolean(value: &Value, path: &LeafPath) -> Result<u8> {
    match value {
        Value::Bool(b) => Ok(u8::from(*b)),
        other => Err(MarshalError::mismatch("bool", other.kind_name(), path)),
    }
}

fn string(value: &Value, path: &LeafPath) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(MarshalError::mismatch("string", other.kind_name(), path)),
    }
}

/// Builds the flat buffer for `element_type` from `payload`.
///
/// Integer kinds narrower than 64 bits keep the low-order bits of each leaf (wrapping,
/// no range check).
pub fn build(element_type: ElementType, shape: &Shape, payload: Payload) -> Result<TensorData> {
    if element_type == ElementType::Unknown {
        return Err(MarshalError::UnsupportedElementType(element_type));
    }

    let items = match payload {
        Payload::Bytes(bytes) => {
            trace!(
                "wrapping {} raw bytes as {element_type} tensor of shape {shape}",
                bytes.len()
            );
            return Ok(TensorData::Raw {
                element_type,
                bytes,
            });
        }
        Payload::Nested(items) => items,
    };

    let size = flatten_size(&items);
    trace!("allocating {size} {element_type} elements for shape {shape}");

    let data = match element_type {
        ElementType::Float32 => TensorData::F32(flatten_with(&items, size, numeric_f32)?),
        ElementType::Float64 => TensorData::F64(flatten_with(&items, size, numeric_f64)?),
        ElementType::UInt8 => {
            TensorData::U8(flatten_with(&items, size, |v, p| long(v, p).map(|x| x as u8))?)
        }
        ElementType::Int8 => {
            TensorData::I8(flatten_with(&items, size, |v, p| long(v, p).map(|x| x as i8))?)
        }
        ElementType::Int16 => {
            TensorData::I16(flatten_with(&items, size, |v, p| long(v, p).map(|x| x as i16))?)
        }
        ElementType::Int32 => {
            TensorData::I32(flatten_with(&items, size, |v, p| long(v, p).map(|x| x as i32))?)
        }
        ElementType::Int64 => TensorData::I64(flatten_with(&items, size, long)?),
        ElementType::Bool => TensorData::Bool(flatten_with(&items, size, boolean)?),
        ElementType::String => TensorData::String(flatten_with(&items, size, string)?),
        ElementType::Unknown => return Err(MarshalError::UnsupportedElementType(element_type)),
    };
    Ok(data)
}

/// Parses a script shape list: every entry must be a non-negative 64-bit integer.
pub fn parse_shape(entries: &[Value]) -> Result<Shape> {
    let mut dims = Vec::with_capacity(entries.len());
    for (pos, entry) in entries.iter().enumerate() {
        match entry {
            Value::I64(dim) => dims.push(*dim),
            other => {
                return Err(MarshalError::InvalidShape(format!(
                    "non integer entry ({}) at position {pos}",
                    other.kind_name()
                )))
            }
        }
    }
    Shape::from_signed(&dims)
}

/// Script-facing entry point: resolves the type name and shape, then builds the buffer.
///
/// Returns the buffer together with the runtime tag of its element type.
pub fn build_tensor_buffer(
    element_type_name: &str,
    shape: &[Value],
    payload: Payload,
) -> Result<(TensorData, &'static str)> {
    let shape = parse_shape(shape)?;
    let element_type: ElementType = element_type_name.parse()?;
    let data = build(element_type, &shape, payload)?;
    Ok((data, element_type.tag()))
}
