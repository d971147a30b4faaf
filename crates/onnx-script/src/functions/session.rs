use std::sync::Arc;

use log::{debug, warn};

use super::ScriptFunction;
use crate::config::ExtensionConfig;
use crate::error::{Result, ScriptError};
use crate::model::{resolve_model, ModelSource, ResourceLoader};
use crate::runtime::{Environment, Session};
use crate::stack::{ScriptStack, StackValue};

const NAME: &str = "ONNX";
const MODEL_KEY: &str = "model";

/// `ONNX`: opens a session on a model, runs a macro with the session on top of the stack,
/// then closes the session whatever the macro's outcome.
pub struct OnnxSession {
    environment: Arc<dyn Environment>,
    config: ExtensionConfig,
    resources: Arc<dyn ResourceLoader>,
}

impl OnnxSession {
    pub fn new(
        environment: Arc<dyn Environment>,
        config: ExtensionConfig,
        resources: Arc<dyn ResourceLoader>,
    ) -> Self {
        Self {
            environment,
            config,
            resources,
        }
    }

    fn open(&self, model: StackValue) -> Result<Arc<dyn Session>> {
        let load_error = ScriptError::runtime(NAME, "error loading ONNX model");
        match model {
            StackValue::Bytes(bytes) => self
                .environment
                .create_session_from_bytes(&bytes)
                .map_err(load_error),
            StackValue::String(path) => {
                let source = resolve_model(&path, &self.config, self.resources.as_ref())
                    .map_err(|source| ScriptError::Model {
                        function: NAME,
                        source,
                    })?;
                match source {
                    ModelSource::File(file) => self
                        .environment
                        .create_session_from_path(&file)
                        .map_err(load_error),
                    ModelSource::Bytes(bytes) => self
                        .environment
                        .create_session_from_bytes(&bytes)
                        .map_err(load_error),
                }
            }
            _ => Err(ScriptError::invalid_argument(
                NAME,
                format!("invalid '{MODEL_KEY}' entry, expected BYTES or STRING."),
            )),
        }
    }
}

impl ScriptFunction for OnnxSession {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(&self, stack: &mut dyn ScriptStack) -> Result<()> {
        let code = match stack.pop()? {
            StackValue::Macro(code) => code,
            _ => return Err(ScriptError::invalid_argument(NAME, "operates on a MACRO.")),
        };

        let model = match stack.pop()? {
            model @ (StackValue::Bytes(_) | StackValue::String(_)) => model,
            params @ StackValue::Map(_) => {
                params.get(MODEL_KEY).cloned().unwrap_or(StackValue::Null)
            }
            _ => {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    "expects a parameter MAP, an ONNX model (BYTES), or a path (STRING) to an ONNX model.",
                ))
            }
        };

        let session = self.open(model)?;
        debug!("opened ONNX session {session:?}");
        stack.push(StackValue::Session(Arc::clone(&session)));

        let outcome = stack.exec(&code);
        let closed = session.close();
        match (outcome, closed) {
            (Ok(()), Ok(())) => {
                debug!("closed ONNX session {session:?}");
                Ok(())
            }
            (Ok(()), Err(err)) => {
                Err(ScriptError::runtime(NAME, "error while closing ONNX session")(err))
            }
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!("failed to close ONNX session after macro error: {close_err:#}");
                Err(err)
            }
        }
    }
}
