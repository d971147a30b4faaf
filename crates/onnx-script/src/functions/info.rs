use onnx_marshal::ElementType;

use super::ScriptFunction;
use crate::error::{Result, ScriptError};
use crate::runtime::{MapInfo, ModelMetadata, NodeInfo, SequenceElement, ValueInfo};
use crate::stack::{ScriptStack, StackValue};

const NAME: &str = "ONNX.INFO";

const METADATA: &str = "model.metadata";
const PRODUCER_NAME: &str = "producer.name";
const GRAPH_NAME: &str = "graph.name";
const GRAPH_DESCRIPTION: &str = "graph.description";
const DOMAIN: &str = "domain";
const DESCRIPTION: &str = "description";
const VERSION: &str = "version";
const CUSTOM_METADATA: &str = "custom.metadata";
const INPUT: &str = "input.info";
const OUTPUT: &str = "output.info";
const NODE_NAME: &str = "name";
const NODE_TYPE: &str = "info.class";
const NODE_INFO: &str = "info";
const TENSOR_ELEMENT_TYPE: &str = "java.type";
const TENSOR_ONNX_TYPE: &str = "onnx.type";
const TENSOR_SHAPE: &str = "shape";
const SEQUENCE_LENGTH: &str = "length";
const SEQUENCE_TYPE: &str = "type";
const MAP_SIZE: &str = "size";
const MAP_KEY_TYPE: &str = "key.type";
const MAP_VALUE_TYPE: &str = "value.type";
const UNKNOWN_INFO: &str = "unknown.valueInfo.subclass";

/// `ONNX.INFO`: describes a session's model (metadata, inputs and outputs) as nested maps.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnnxInfo;

fn map<I>(entries: I) -> StackValue
where
    I: IntoIterator<Item = (&'static str, StackValue)>,
{
    StackValue::Map(
        entries
            .into_iter()
            .map(|(k, v)| (StackValue::from(k), v))
            .collect(),
    )
}

fn type_name(element_type: ElementType) -> StackValue {
    StackValue::from(element_type.tag())
}

fn metadata_to_map(metadata: ModelMetadata) -> StackValue {
    let custom = metadata
        .custom_metadata
        .into_iter()
        .map(|(k, v)| (StackValue::String(k), StackValue::String(v)))
        .collect();
    map([
        (PRODUCER_NAME, StackValue::String(metadata.producer_name)),
        (GRAPH_NAME, StackValue::String(metadata.graph_name)),
        (GRAPH_DESCRIPTION, StackValue::String(metadata.graph_description)),
        (DOMAIN, StackValue::String(metadata.domain)),
        (DESCRIPTION, StackValue::String(metadata.description)),
        (VERSION, StackValue::Long(metadata.version)),
        (CUSTOM_METADATA, StackValue::Map(custom)),
    ])
}

fn map_info_to_map(info: MapInfo) -> StackValue {
    map([
        (MAP_SIZE, StackValue::Long(info.size)),
        (MAP_KEY_TYPE, type_name(info.key_type)),
        (MAP_VALUE_TYPE, type_name(info.value_type)),
    ])
}

fn value_info_to_map(info: ValueInfo) -> StackValue {
    match info {
        ValueInfo::Tensor {
            element_type,
            onnx_type,
            shape,
        } => map([
            (TENSOR_ELEMENT_TYPE, type_name(element_type)),
            (TENSOR_ONNX_TYPE, StackValue::String(onnx_type)),
            (
                TENSOR_SHAPE,
                StackValue::List(shape.into_iter().map(StackValue::Long).collect()),
            ),
        ]),
        ValueInfo::Sequence { length, element } => {
            let element = match element {
                SequenceElement::Type(t) => type_name(t),
                SequenceElement::Map(info) => map_info_to_map(info),
            };
            map([
                (SEQUENCE_LENGTH, StackValue::Long(length)),
                (SEQUENCE_TYPE, element),
            ])
        }
        ValueInfo::Map(info) => map_info_to_map(info),
        ValueInfo::Other { description } => map([(UNKNOWN_INFO, StackValue::String(description))]),
    }
}

fn nodes_to_map(nodes: Vec<NodeInfo>) -> StackValue {
    let entries = nodes
        .into_iter()
        .map(|node| {
            let class = StackValue::from(node.info.class_name());
            let description = map([
                (NODE_NAME, StackValue::String(node.name.clone())),
                (NODE_TYPE, class),
                (NODE_INFO, value_info_to_map(node.info)),
            ]);
            (StackValue::String(node.name), description)
        })
        .collect();
    StackValue::Map(entries)
}

impl ScriptFunction for OnnxInfo {
    fn name(&self) -> &'static str {
        NAME
    }

    fn apply(&self, stack: &mut dyn ScriptStack) -> Result<()> {
        let session = match stack.pop()? {
            StackValue::Session(session) => session,
            _ => {
                return Err(ScriptError::invalid_argument(
                    NAME,
                    "operates on an ONNX session.",
                ))
            }
        };

        let read_error =
            || ScriptError::runtime(NAME, "encountered an error while reading model information");
        let metadata = session.metadata().map_err(read_error())?;
        let inputs = session.input_info().map_err(read_error())?;
        let outputs = session.output_info().map_err(read_error())?;

        stack.push(map([
            (METADATA, metadata_to_map(metadata)),
            (INPUT, nodes_to_map(inputs)),
            (OUTPUT, nodes_to_map(outputs)),
        ]));
        Ok(())
    }
}
