//! Collaborator traits for the external inference runtime, and the model descriptors it
//! reports.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use onnx_marshal::{ElementType, OnnxValue, Tensor};
use serde::{Deserialize, Serialize};

/// Entry point of the runtime: turns serialized models into sessions.
pub trait Environment: Send + Sync {
    fn create_session_from_bytes(&self, model: &[u8]) -> Result<Arc<dyn Session>>;

    fn create_session_from_path(&self, path: &Path) -> Result<Arc<dyn Session>>;
}

/// A loaded model.
///
/// Sessions are shared by handle; `close` releases runtime resources and any later call
/// is expected to fail.
pub trait Session: fmt::Debug + Send + Sync {
    /// Runs inference. Outputs are returned in the model's declared output order.
    fn run(&self, inputs: &[(String, Tensor)]) -> Result<Vec<(String, OnnxValue)>>;

    fn metadata(&self) -> Result<ModelMetadata>;

    fn input_info(&self) -> Result<Vec<NodeInfo>>;

    fn output_info(&self) -> Result<Vec<NodeInfo>>;

    fn close(&self) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub producer_name: String,
    pub graph_name: String,
    pub graph_description: String,
    pub domain: String,
    pub description: String,
    pub version: i64,
    #[serde(default)]
    pub custom_metadata: BTreeMap<String, String>,
}

/// Named model input or output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub info: ValueInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Entry count, `-1` when unknown.
    pub size: i64,
    pub key_type: ElementType,
    pub value_type: ElementType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequenceElement {
    Type(ElementType),
    Map(MapInfo),
}

/// Description of the value flowing through a model input or output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueInfo {
    Tensor {
        element_type: ElementType,
        /// Runtime-level element type name, e.g. `ONNX_TENSOR_ELEMENT_DATA_TYPE_FLOAT`.
        onnx_type: String,
        /// Extents; symbolic dimensions are reported as `-1`.
        shape: Vec<i64>,
    },
    Sequence {
        length: i64,
        element: SequenceElement,
    },
    Map(MapInfo),
    Other { description: String },
}

impl ValueInfo {
    /// Descriptor class name as reported to scripts.
    pub fn class_name(&self) -> &'static str {
        match self {
            ValueInfo::Tensor { .. } => "TensorInfo",
            ValueInfo::Sequence { .. } => "SequenceInfo",
            ValueInfo::Map(_) => "MapInfo",
            ValueInfo::Other { .. } => "ValueInfo",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_info_serializes_with_kind_tag() {
        let info = ValueInfo::Tensor {
            element_type: ElementType::Int64,
            onnx_type: "ONNX_TENSOR_ELEMENT_DATA_TYPE_INT64".to_string(),
            shape: vec![-1, 3],
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["kind"], "tensor");
        assert_eq!(json["element_type"], "Int64");
        let back: ValueInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
        assert_eq!(back.class_name(), "TensorInfo");
    }
}
