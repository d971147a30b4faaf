//! Script-engine bindings for an ONNX inference runtime.
//!
//! [`OnnxExtension`] bundles the functions a stack-based script engine registers: `ONNX`
//! (session scope), `ONNX.RUN`, `ONNX.TENSOR`, `ONNX.INFO` and `TOONNX`. The inference
//! runtime itself is supplied by the embedder through [`Environment`] and [`Session`].

pub mod config;
pub mod error;
pub mod functions;
pub mod model;
pub mod runtime;
pub mod stack;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

pub use config::ExtensionConfig;
pub use error::{Result, ScriptError};
pub use functions::{OnnxInfo, OnnxRun, OnnxSession, OnnxTensor, ScriptFunction, ToOnnx};
pub use model::{resolve_model, EmbeddedResources, ModelError, ModelSource, ResourceLoader};
pub use runtime::{
    Environment, MapInfo, ModelMetadata, NodeInfo, SequenceElement, Session, ValueInfo,
};
pub use stack::{Macro, MemoryStack, ScriptStack, StackValue};

/// Registry of the extension's functions, keyed by script name.
pub struct OnnxExtension {
    functions: BTreeMap<&'static str, Arc<dyn ScriptFunction>>,
}

impl OnnxExtension {
    pub fn new(
        environment: Arc<dyn Environment>,
        config: ExtensionConfig,
        resources: Arc<dyn ResourceLoader>,
    ) -> Self {
        let functions: [Arc<dyn ScriptFunction>; 5] = [
            Arc::new(OnnxSession::new(environment, config, resources)),
            Arc::new(OnnxRun),
            Arc::new(OnnxTensor),
            Arc::new(OnnxInfo),
            Arc::new(ToOnnx),
        ];
        let functions = functions
            .into_iter()
            .map(|function| (function.name(), function))
            .collect();
        Self { functions }
    }

    /// Extension configured from the process environment, with no embedded resources.
    pub fn from_env(environment: Arc<dyn Environment>) -> Self {
        Self::new(
            environment,
            ExtensionConfig::from_env(),
            Arc::new(EmbeddedResources::new()),
        )
    }

    pub fn function(&self, name: &str) -> Option<&Arc<dyn ScriptFunction>> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    /// Invokes the function registered under `name`, or returns `None` if there is none.
    pub fn call(&self, name: &str, stack: &mut dyn ScriptStack) -> Option<Result<()>> {
        let function = self.functions.get(name)?;
        debug!("calling {name} with stack depth {}", stack.depth());
        Some(function.apply(stack))
    }
}
