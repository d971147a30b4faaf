//! Script-side value model and the stack the functions operate on.

use std::fmt;
use std::sync::Arc;

use onnx_marshal::{MapKey, Mapping, MarshalError, Tensor, TypedArray, Value};

use crate::error::{Result, ScriptError};
use crate::runtime::Session;

/// Executable script code, invoked against the stack it is executed on.
#[derive(Clone)]
pub struct Macro(Arc<dyn Fn(&mut dyn ScriptStack) -> Result<()> + Send + Sync>);

impl Macro {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut dyn ScriptStack) -> Result<()> + Send + Sync + 'static,
    {
        Macro(Arc::new(body))
    }

    pub fn call(&self, stack: &mut dyn ScriptStack) -> Result<()> {
        (self.0)(stack)
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Macro")
    }
}

/// A value living on the script stack.
///
/// Maps keep their insertion order; keys are usually strings or longs.
#[derive(Debug, Clone)]
pub enum StackValue {
    Null,
    Long(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<StackValue>),
    Map(Vec<(StackValue, StackValue)>),
    Macro(Macro),
    Session(Arc<dyn Session>),
    Tensor(Tensor),
}

impl StackValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            StackValue::Null => "NULL",
            StackValue::Long(_) => "LONG",
            StackValue::Double(_) => "DOUBLE",
            StackValue::Bool(_) => "BOOLEAN",
            StackValue::String(_) => "STRING",
            StackValue::Bytes(_) => "BYTES",
            StackValue::List(_) => "LIST",
            StackValue::Map(_) => "MAP",
            StackValue::Macro(_) => "MACRO",
            StackValue::Session(_) => "ONNX SESSION",
            StackValue::Tensor(_) => "ONNX TENSOR",
        }
    }

    /// Looks up a string key in a map value.
    pub fn get(&self, key: &str) -> Option<&StackValue> {
        match self {
            StackValue::Map(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, StackValue::String(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            StackValue::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            StackValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StackValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[StackValue]> {
        match self {
            StackValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            StackValue::Tensor(t) => Some(t),
            _ => None,
        }
    }
}

impl From<i64> for StackValue {
    fn from(v: i64) -> Self {
        StackValue::Long(v)
    }
}

impl From<f64> for StackValue {
    fn from(v: f64) -> Self {
        StackValue::Double(v)
    }
}

impl From<bool> for StackValue {
    fn from(v: bool) -> Self {
        StackValue::Bool(v)
    }
}

impl From<&str> for StackValue {
    fn from(v: &str) -> Self {
        StackValue::String(v.to_string())
    }
}

impl From<String> for StackValue {
    fn from(v: String) -> Self {
        StackValue::String(v)
    }
}

impl From<Vec<StackValue>> for StackValue {
    fn from(items: Vec<StackValue>) -> Self {
        StackValue::List(items)
    }
}

impl From<MapKey> for StackValue {
    fn from(key: MapKey) -> Self {
        match key {
            MapKey::Int(v) => StackValue::Long(v),
            MapKey::String(s) => StackValue::String(s),
        }
    }
}

/// Results handed back to the script. Every integer width becomes a `LONG`, every float a
/// `DOUBLE`, and arrays become lists. Opaque values have no script form.
impl TryFrom<Value> for StackValue {
    type Error = MarshalError;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            Value::Bool(v) => StackValue::Bool(v),
            Value::I8(v) => StackValue::Long(i64::from(v)),
            Value::I16(v) => StackValue::Long(i64::from(v)),
            Value::I32(v) => StackValue::Long(i64::from(v)),
            Value::I64(v) => StackValue::Long(v),
            Value::F32(v) => StackValue::Double(f64::from(v)),
            Value::F64(v) => StackValue::Double(v),
            Value::String(s) => StackValue::String(s),
            Value::Bytes(b) => StackValue::Bytes(b),
            Value::Sequence(items) => StackValue::List(
                items
                    .into_iter()
                    .map(StackValue::try_from)
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Value::Mapping(map) => StackValue::Map(
                map.into_iter()
                    .map(|(k, v)| StackValue::try_from(v).map(|v| (StackValue::from(k), v)))
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Value::Array(array) => array_to_stack(array)?,
            Value::Opaque(type_name) => return Err(MarshalError::UnsupportedValueType(type_name)),
        })
    }
}

fn array_to_stack(array: TypedArray) -> std::result::Result<StackValue, MarshalError> {
    let items = match array {
        TypedArray::Empty => Vec::new(),
        TypedArray::Bool(v) => v.into_iter().map(StackValue::Bool).collect(),
        TypedArray::I8(v) => v.into_iter().map(|x| StackValue::Long(x.into())).collect(),
        TypedArray::I16(v) => v.into_iter().map(|x| StackValue::Long(x.into())).collect(),
        TypedArray::I32(v) => v.into_iter().map(|x| StackValue::Long(x.into())).collect(),
        TypedArray::I64(v) => v.into_iter().map(StackValue::Long).collect(),
        TypedArray::F32(v) => v.into_iter().map(|x| StackValue::Double(x.into())).collect(),
        TypedArray::F64(v) => v.into_iter().map(StackValue::Double).collect(),
        TypedArray::String(v) => v.into_iter().map(StackValue::String).collect(),
        TypedArray::Nested(children) => children
            .into_iter()
            .map(array_to_stack)
            .collect::<std::result::Result<_, _>>()?,
        TypedArray::Object(values) => values
            .into_iter()
            .map(StackValue::try_from)
            .collect::<std::result::Result<_, _>>()?,
    };
    Ok(StackValue::List(items))
}

/// Payload conversion: only plain data crosses into the marshalling layer.
impl TryFrom<&StackValue> for Value {
    type Error = MarshalError;

    fn try_from(value: &StackValue) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            StackValue::Long(v) => Value::I64(*v),
            StackValue::Double(v) => Value::F64(*v),
            StackValue::Bool(v) => Value::Bool(*v),
            StackValue::String(s) => Value::String(s.clone()),
            StackValue::Bytes(b) => Value::Bytes(b.clone()),
            StackValue::List(items) => Value::Sequence(
                items
                    .iter()
                    .map(Value::try_from)
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            ),
            StackValue::Map(entries) => {
                let mut map = Mapping::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match key {
                        StackValue::Long(v) => MapKey::Int(*v),
                        StackValue::String(s) => MapKey::String(s.clone()),
                        other => return Err(MarshalError::UnsupportedLeafType(other.type_name())),
                    };
                    map.insert(key, Value::try_from(value)?);
                }
                Value::Mapping(map)
            }
            other => return Err(MarshalError::UnsupportedLeafType(other.type_name())),
        })
    }
}

/// Operand stack of a script execution.
pub trait ScriptStack {
    fn pop(&mut self) -> Result<StackValue>;
    fn push(&mut self, value: StackValue);
    /// Runs `code` against this stack.
    fn exec(&mut self, code: &Macro) -> Result<()>;
    fn depth(&self) -> usize;
}

/// Vector-backed stack; the last element is the top.
#[derive(Debug, Default)]
pub struct MemoryStack {
    values: Vec<StackValue>,
}

impl MemoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> Option<&StackValue> {
        self.values.last()
    }

    pub fn into_values(self) -> Vec<StackValue> {
        self.values
    }
}

impl FromIterator<StackValue> for MemoryStack {
    fn from_iter<I: IntoIterator<Item = StackValue>>(iter: I) -> Self {
        MemoryStack {
            values: iter.into_iter().collect(),
        }
    }
}

impl ScriptStack for MemoryStack {
    fn pop(&mut self) -> Result<StackValue> {
        self.values.pop().ok_or(ScriptError::StackUnderflow)
    }

    fn push(&mut self, value: StackValue) {
        self.values.push(value);
    }

    fn exec(&mut self, code: &Macro) -> Result<()> {
        code.call(self)
    }

    fn depth(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_runs_against_the_stack() {
        let double = Macro::new(|stack| {
            let v = stack.pop()?.as_long().unwrap_or_default();
            stack.push(StackValue::Long(v * 2));
            Ok(())
        });
        let mut stack: MemoryStack = [StackValue::Long(21)].into_iter().collect();
        stack.exec(&double).unwrap();
        assert_eq!(stack.peek().and_then(StackValue::as_long), Some(42));
    }

    #[test]
    fn pop_on_empty_stack_underflows() {
        let mut stack = MemoryStack::new();
        assert!(matches!(stack.pop(), Err(ScriptError::StackUnderflow)));
    }

    #[test]
    fn results_widen_to_long_and_double() {
        let value = Value::Sequence(vec![Value::I32(3), Value::F32(0.5)]);
        let StackValue::List(items) = StackValue::try_from(value).unwrap() else {
            panic!("list expected");
        };
        assert_eq!(items[0].as_long(), Some(3));
        assert_eq!(items[1].as_double(), Some(0.5));
    }

    #[test]
    fn opaque_results_have_no_script_form() {
        let value = Value::Mapping(
            [("handle", Value::Opaque("OnnxOpaque".into()))]
                .into_iter()
                .collect(),
        );
        let err = StackValue::try_from(value).expect_err("opaque entry");
        assert_eq!(err, MarshalError::UnsupportedValueType("OnnxOpaque".into()));
    }

    #[test]
    fn macros_do_not_cross_into_payloads() {
        let list = StackValue::List(vec![
            StackValue::Long(1),
            StackValue::Macro(Macro::new(|_| Ok(()))),
        ]);
        let err = Value::try_from(&list).expect_err("macro leaf");
        assert_eq!(err, MarshalError::UnsupportedLeafType("MACRO"));
    }

    #[test]
    fn map_lookup_uses_string_keys() {
        let map = StackValue::Map(vec![
            (StackValue::Long(1), StackValue::from("one")),
            (StackValue::from("model"), StackValue::from("a.onnx")),
        ]);
        assert_eq!(map.get("model").and_then(StackValue::as_str), Some("a.onnx"));
        assert!(map.get("1").is_none());
    }
}
