//! Marshalling between a stack-based scripting host and an ONNX inference runtime.
//!
//! The crate covers three conversions:
//! - script lists (or raw bytes) into flat typed tensor buffers ([`build_tensor_buffer`]),
//! - script lists into homogeneous typed arrays ([`infer_array`]) and host tensors,
//! - runtime outputs back into the host's canonical value model ([`canonicalize`]).

mod builder;
mod canonical;
pub mod error;
mod infer;
pub mod runtime;
pub mod tensor;
pub mod value;

pub use builder::{build, build_tensor_buffer, flatten_size, flatten_with, parse_shape, Payload};
pub use canonical::canonicalize;
pub use error::{LeafPath, MarshalError, Result};
pub use infer::infer_array;
pub use runtime::{canonicalize_runtime_value, OnnxValue, OnnxValueType};
pub use tensor::{ElementType, Shape, Tensor, TensorData};
pub use value::{MapKey, Mapping, TypedArray, Value};
