use onnx_marshal::MarshalError;
use thiserror::Error;

use crate::model::ModelError;

/// Failure of a script function, tagged with the function's name.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("{function} {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },

    #[error("{function}: {source}")]
    Marshal {
        function: &'static str,
        #[source]
        source: MarshalError,
    },

    #[error("{function} {source}")]
    Model {
        function: &'static str,
        #[source]
        source: ModelError,
    },

    #[error("{function} {message}: {source:#}")]
    Runtime {
        function: &'static str,
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ScriptError {
    pub fn invalid_argument(function: &'static str, message: impl Into<String>) -> Self {
        ScriptError::InvalidArgument {
            function,
            message: message.into(),
        }
    }

    pub(crate) fn marshal(function: &'static str) -> impl FnOnce(MarshalError) -> Self {
        move |source| ScriptError::Marshal { function, source }
    }

    pub(crate) fn runtime(
        function: &'static str,
        message: &'static str,
    ) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| ScriptError::Runtime {
            function,
            message,
            source,
        }
    }

    /// Name of the function that raised the error, when known.
    pub fn function(&self) -> Option<&'static str> {
        match self {
            ScriptError::InvalidArgument { function, .. }
            | ScriptError::Marshal { function, .. }
            | ScriptError::Model { function, .. }
            | ScriptError::Runtime { function, .. } => Some(function),
            ScriptError::StackUnderflow => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScriptError>;
