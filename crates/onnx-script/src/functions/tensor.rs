use onnx_marshal::{build, parse_shape, ElementType, Payload, Tensor, Value};

use super::ScriptFunction;
use crate::error::{Result, ScriptError};
use crate::stack::{ScriptStack, StackValue};

const NAME: &str = "ONNX.TENSOR";

/// `ONNX.TENSOR`: builds a tensor of an explicit element type from data, type name and
/// shape (the shape on top).
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxTensor;

fn to_values(items: &[StackValue]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| Value::try_from(item).map_err(ScriptError::marshal(NAME)))
        .collect()
}

impl ScriptFunction for OnnxTensor {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(&self, stack: &mut dyn ScriptStack) -> Result<()> {
        let shape = match stack.pop()? {
            StackValue::List(items) => to_values(&items)?,
            _ => return Err(ScriptError::invalid_argument(NAME, "expects a shape (LIST).")),
        };
        let dims = parse_shape(&shape).map_err(ScriptError::marshal(NAME))?;

        let type_name = match stack.pop()? {
            StackValue::String(name) => name,
            _ => {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    format!(
                        "expects an ONNX element type as a STRING. One of: [{}]",
                        ElementType::tag_list()
                    ),
                ))
            }
        };

        let payload = match stack.pop()? {
            StackValue::List(items) => Payload::Nested(to_values(&items)?),
            StackValue::Bytes(bytes) => Payload::Bytes(bytes),
            _ => {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    "expects input data as LIST or BYTES.",
                ))
            }
        };

        let element_type: ElementType = type_name.parse().map_err(ScriptError::marshal(NAME))?;
        let data = build(element_type, &dims, payload).map_err(ScriptError::marshal(NAME))?;
        let tensor = Tensor::new(dims, data).map_err(ScriptError::marshal(NAME))?;
        stack.push(StackValue::Tensor(tensor));
        Ok(())
    }
}
