//! Dynamic value model exchanged with the scripting host and the inference runtime.
//!
//! [`Value`] is wide enough to describe anything the runtime hands back (boxed scalars of
//! every width, homogeneous arrays, sequences, maps, opaque handles). The canonical subset
//! produced by [`crate::canonicalize`] only uses `Bool`, `I64`, `F64`, `String`, `Sequence`
//! and `Mapping`.

use std::collections::HashMap;
use std::fmt;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    /// Raw byte payload (script `BYTES`). Bytes are signed when read back as numbers.
    Bytes(Vec<u8>),
    Sequence(Vec<Value>),
    Mapping(Mapping),
    /// Homogeneous array as materialised by the runtime or by array inference.
    Array(TypedArray),
    /// Runtime value with no known representation, identified by its type name.
    Opaque(String),
}

impl Value {
    /// Short kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Array(_) => "array",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Reads any numeric scalar as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::I8(v) => Some(f64::from(v)),
            Value::I16(v) => Some(f64::from(v)),
            Value::I32(v) => Some(f64::from(v)),
            Value::I64(v) => Some(v as f64),
            Value::F32(v) => Some(f64::from(v)),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Reads any numeric scalar as an `f32`.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(v) => Some(v),
            Value::I8(v) => Some(f32::from(v)),
            Value::I16(v) => Some(f32::from(v)),
            Value::I32(v) => Some(v as f32),
            Value::I64(v) => Some(v as f32),
            Value::F64(v) => Some(v as f32),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Reports whether the value only uses the canonical alphabet, at every depth.
    pub fn is_canonical(&self) -> bool {
        match self {
            Value::Bool(_) | Value::I64(_) | Value::F64(_) | Value::String(_) => true,
            Value::Sequence(items) => items.iter().all(Value::is_canonical),
            Value::Mapping(map) => map.values().all(Value::is_canonical),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl From<TypedArray> for Value {
    fn from(array: TypedArray) -> Self {
        Value::Array(array)
    }
}

/// Keys allowed in runtime maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Int(i64),
    String(String),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Int(v) => write!(f, "{v}"),
            MapKey::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        MapKey::Int(v)
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        MapKey::String(v.to_string())
    }
}

impl From<String> for MapKey {
    fn from(v: String) -> Self {
        MapKey::String(v)
    }
}

/// Insertion-ordered map with unique keys.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    entries: Vec<(MapKey, Value)>,
    by_key: HashMap<MapKey, usize>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            by_key: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts or replaces `key`. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<MapKey>, value: Value) -> Option<Value> {
        let key = key.into();
        if let Some(&idx) = self.by_key.get(&key) {
            return Some(std::mem::replace(&mut self.entries[idx].1, value));
        }
        self.by_key.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &MapKey) -> Option<&Value> {
        self.by_key.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &MapKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl IntoIterator for Mapping {
    type Item = (MapKey, Value);
    type IntoIter = std::vec::IntoIter<(MapKey, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<MapKey>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Homogeneous array, possibly nested and jagged.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    /// Zero-length array whose element kind could not be determined.
    Empty,
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    String(Vec<String>),
    /// Array of arrays; children are typed independently.
    Nested(Vec<TypedArray>),
    /// Array of boxed values.
    Object(Vec<Value>),
}

impl TypedArray {
    pub fn len(&self) -> usize {
        match self {
            TypedArray::Empty => 0,
            TypedArray::Bool(v) => v.len(),
            TypedArray::I8(v) => v.len(),
            TypedArray::I16(v) => v.len(),
            TypedArray::I32(v) => v.len(),
            TypedArray::I64(v) => v.len(),
            TypedArray::F32(v) => v.len(),
            TypedArray::F64(v) => v.len(),
            TypedArray::String(v) => v.len(),
            TypedArray::Nested(v) => v.len(),
            TypedArray::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind name of the array's elements.
    pub fn element_kind(&self) -> &'static str {
        match self {
            TypedArray::Empty => "empty",
            TypedArray::Bool(_) => "bool",
            TypedArray::I8(_) => "i8",
            TypedArray::I16(_) => "i16",
            TypedArray::I32(_) => "i32",
            TypedArray::I64(_) => "i64",
            TypedArray::F32(_) => "f32",
            TypedArray::F64(_) => "f64",
            TypedArray::String(_) => "string",
            TypedArray::Nested(_) => "array",
            TypedArray::Object(_) => "object",
        }
    }
}
