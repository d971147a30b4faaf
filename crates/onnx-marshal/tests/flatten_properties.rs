use onnx_marshal::{
    build, flatten_size, flatten_with, ElementType, Payload, Shape, TensorData, Value,
};
use proptest::prelude::*;

fn nested_longs() -> impl Strategy<Value = Value> {
    let leaf = any::<i64>().prop_map(Value::I64);
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(Value::Sequence)
    })
}

const FIXED_WIDTH: [ElementType; 8] = [
    ElementType::Float32,
    ElementType::Float64,
    ElementType::UInt8,
    ElementType::Int8,
    ElementType::Int16,
    ElementType::Int32,
    ElementType::Int64,
    ElementType::Bool,
];

fn nested_leaves_for(element_type: ElementType) -> impl Strategy<Value = Vec<Value>> {
    let leaf = if element_type == ElementType::Bool {
        any::<bool>().prop_map(Value::Bool).boxed()
    } else {
        any::<i64>().prop_map(Value::I64).boxed()
    };
    let nested = leaf.prop_recursive(4, 64, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(Value::Sequence)
    });
    prop::collection::vec(nested, 0..8)
}

fn fixed_width_payload() -> impl Strategy<Value = (ElementType, Vec<Value>)> {
    prop::sample::select(FIXED_WIDTH.to_vec()).prop_flat_map(|element_type| {
        nested_leaves_for(element_type).prop_map(move |items| (element_type, items))
    })
}

fn leaves_in_order(value: &Value, out: &mut Vec<i64>) {
    match value {
        Value::Sequence(items) => items.iter().for_each(|item| leaves_in_order(item, out)),
        Value::I64(v) => out.push(*v),
        other => panic!("unexpected leaf {other:?}"),
    }
}

proptest! {
    #[test]
    fn prop_buffer_length_matches_flatten_size(
        items in prop::collection::vec(nested_longs(), 0..8)
    ) {
        let size = flatten_size(&items);
        let flat = flatten_with(&items, size, |v, _| Ok(v.clone()))?;
        prop_assert_eq!(flat.len(), size);
    }

    #[test]
    fn prop_int64_buffer_preserves_depth_first_order(
        items in prop::collection::vec(nested_longs(), 0..8)
    ) {
        let mut expected = Vec::new();
        items.iter().for_each(|item| leaves_in_order(item, &mut expected));
        let shape = Shape::new(&[expected.len()]);
        let data = build(ElementType::Int64, &shape, Payload::Nested(items))?;
        prop_assert_eq!(data, TensorData::I64(expected));
    }

    #[test]
    fn prop_uint8_keeps_low_order_bits(values in prop::collection::vec(any::<i64>(), 0..32)) {
        let items: Vec<Value> = values.iter().copied().map(Value::I64).collect();
        let data = build(ElementType::UInt8, &Shape::new(&[values.len()]), Payload::Nested(items))?;
        let expected: Vec<u8> = values.iter().map(|v| (*v & 0xff) as u8).collect();
        prop_assert_eq!(data, TensorData::U8(expected));
    }

    #[test]
    fn prop_fixed_width_buffers_hold_one_element_per_leaf(
        (element_type, items) in fixed_width_payload()
    ) {
        let size = flatten_size(&items);
        let data = build(element_type, &Shape::new(&[size]), Payload::Nested(items))?;
        prop_assert_eq!(data.element_type(), element_type);
        prop_assert_eq!(data.len(), size);
        let width = element_type.size_in_bytes().unwrap_or_default();
        prop_assert_eq!(data.byte_len(), Some(size * width));
    }
}
