//! The script functions exposed by the extension.

mod info;
mod run;
mod session;
mod tensor;
mod to_onnx;

pub use info::OnnxInfo;
pub use run::OnnxRun;
pub use session::OnnxSession;
pub use tensor::OnnxTensor;
pub use to_onnx::ToOnnx;

use crate::error::Result;
use crate::stack::ScriptStack;

/// A named function callable from scripts. Arguments are popped from the stack and
/// results pushed back.
pub trait ScriptFunction: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, stack: &mut dyn ScriptStack) -> Result<()>;
}
