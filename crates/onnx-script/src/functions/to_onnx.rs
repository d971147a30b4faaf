use onnx_marshal::{infer_array, Tensor, Value};

use super::ScriptFunction;
use crate::error::{Result, ScriptError};
use crate::stack::{ScriptStack, StackValue};

const NAME: &str = "TOONNX";

/// `TOONNX`: converts a list (element type inferred) or a scalar into a tensor.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToOnnx;

impl ScriptFunction for ToOnnx {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(&self, stack: &mut dyn ScriptStack) -> Result<()> {
        let tensor = match stack.pop()? {
            StackValue::List(items) => {
                let values = items
                    .iter()
                    .map(Value::try_from)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(ScriptError::marshal(NAME))?;
                infer_array(&values).and_then(|array| Tensor::from_array(&array))
            }
            scalar @ (StackValue::Long(_) | StackValue::Double(_) | StackValue::String(_)) => {
                Value::try_from(&scalar).and_then(|value| Tensor::from_scalar(&value))
            }
            _ => {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    "operates on a LIST, STRING, LONG or DOUBLE.",
                ))
            }
        }
        .map_err(ScriptError::marshal(NAME))?;
        stack.push(StackValue::Tensor(tensor));
        Ok(())
    }
}
