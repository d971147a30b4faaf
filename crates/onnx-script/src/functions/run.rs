use log::debug;
use onnx_marshal::canonicalize_runtime_value;

use super::ScriptFunction;
use crate::error::{Result, ScriptError};
use crate::stack::{ScriptStack, StackValue};

const NAME: &str = "ONNX.RUN";

/// `ONNX.RUN`: feeds a map of named tensors to a session and pushes the outputs, converted
/// to script values, in the model's output order.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxRun;

impl ScriptFunction for OnnxRun {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(&self, stack: &mut dyn ScriptStack) -> Result<()> {
        let entries = match stack.pop()? {
            StackValue::Map(entries) => entries,
            _ => {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    "expects a MAP of tensors as input.",
                ))
            }
        };
        let session = match stack.pop()? {
            StackValue::Session(session) => session,
            _ => {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    "operates on an ONNX session.",
                ))
            }
        };

        let mut inputs = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let StackValue::String(name) = key else {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    "tensor keys are expected to be STRINGs.",
                ));
            };
            let StackValue::Tensor(tensor) = value else {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    format!("invalid value for key '{name}', not an ONNX tensor."),
                ));
            };
            inputs.push((name, tensor));
        }

        let outputs = session
            .run(&inputs)
            .map_err(ScriptError::runtime(
                NAME,
                "encountered an error while performing inference",
            ))?;
        debug!("inference produced {} outputs from {} inputs", outputs.len(), inputs.len());

        let mut results = Vec::with_capacity(outputs.len());
        for (name, value) in outputs {
            let value = canonicalize_runtime_value(value)
                .and_then(StackValue::try_from)
                .map_err(ScriptError::marshal(NAME))?;
            results.push((StackValue::String(name), value));
        }
        stack.push(StackValue::Map(results));
        Ok(())
    }
}
