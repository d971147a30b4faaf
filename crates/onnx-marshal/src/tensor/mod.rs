//! Tensor-side types: element kinds, shapes, flat buffers and the host tensor wrapper.
//!
//! The builder ([`crate::build`]) produces [`TensorData`]; [`Tensor`] pairs it with a
//! [`Shape`] and performs the element-count checks the inference runtime would apply.

mod data;
pub mod dtype;
mod host_tensor;
pub mod shape;

pub use data::TensorData;
pub use dtype::ElementType;
pub use host_tensor::Tensor;
pub use shape::Shape;
