//! Per-type conversion between field values and the wire envelope.
//!
//! Scalars and simple composites (numbers, strings, arrays, string-keyed
//! maps) become plain JSON with no payload. [`Buffer`] is the bulk-binary
//! type: it encodes as a reference marker plus one payload.
//!
//! Every impl obeys the round-trip law `decode(encode(v)) == v`, with two
//! exceptions that have no wire form: non-finite floats (JSON has no NaN
//! or infinity, so they encode as `null`) and free-form JSON holding an
//! object shaped like a buffer reference marker.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use leafwire_types::{buffer_ref, contains_buffer_ref, parse_buffer_ref, Buffer, Encoded};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::DecodeError;

/// Conversion of one field type to and from its wire representation.
pub trait StateCodec: Sized {
    /// Encode into a structured value, appending any payloads to `buffers`.
    ///
    /// Reference markers index into `buffers` as it stands after the call.
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value;

    /// Decode from a structured value, resolving markers against `buffers`.
    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError>;

    /// Encode on its own: markers start at 0.
    fn encode(&self) -> Encoded {
        let mut buffers = Vec::new();
        let value = self.encode_into(&mut buffers);
        Encoded { value, buffers }
    }

    /// Combine a freshly decoded inbound value with the current one.
    ///
    /// Plain values are replaced outright. Types holding non-wire state
    /// (ownership of child widgets) override this to carry it over.
    fn merge_from_patch(current: &Self, incoming: Self) -> Self {
        let _ = current;
        incoming
    }
}

macro_rules! copy_codec {
    ($($ty:ty => $expected:literal, $check:ident);* $(;)?) => {$(
        impl StateCodec for $ty {
            fn encode_into(&self, _buffers: &mut Vec<Buffer>) -> Value {
                Value::from(*self)
            }

            fn decode(value: &Value, _buffers: &[Buffer]) -> Result<Self, DecodeError> {
                if !value.$check() {
                    return Err(DecodeError::shape($expected, value));
                }
                <$ty>::deserialize(value).map_err(|e| DecodeError::invalid($expected, e))
            }
        }
    )*};
}

copy_codec! {
    bool => "bool", is_boolean;
    i32 => "i32", is_number;
    i64 => "i64", is_number;
    u32 => "u32", is_number;
    u64 => "u64", is_number;
}

macro_rules! float_codec {
    ($($ty:ty => $expected:literal);* $(;)?) => {$(
        /// NaN and infinities are not representable; they go out as `null`,
        /// which does not decode back.
        impl StateCodec for $ty {
            fn encode_into(&self, _buffers: &mut Vec<Buffer>) -> Value {
                if !self.is_finite() {
                    warn!(value = %self, "non-finite float has no JSON form, encoding null");
                }
                Value::from(*self)
            }

            fn decode(value: &Value, _buffers: &[Buffer]) -> Result<Self, DecodeError> {
                if !value.is_number() {
                    return Err(DecodeError::shape($expected, value));
                }
                <$ty>::deserialize(value).map_err(|e| DecodeError::invalid($expected, e))
            }
        }
    )*};
}

float_codec! {
    f32 => "f32";
    f64 => "f64";
}

impl StateCodec for String {
    fn encode_into(&self, _buffers: &mut Vec<Buffer>) -> Value {
        Value::String(self.clone())
    }

    fn decode(value: &Value, _buffers: &[Buffer]) -> Result<Self, DecodeError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DecodeError::shape("string", value))
    }
}

/// Free-form JSON passes through untouched.
///
/// It carries no payloads, so an object shaped like a buffer reference
/// marker (`{"type":"bytes","index":N}`) is reserved: encoding one only
/// warns, decoding one is rejected.
impl StateCodec for Value {
    fn encode_into(&self, _buffers: &mut Vec<Buffer>) -> Value {
        if contains_buffer_ref(self) {
            warn!("free-form value contains a buffer reference marker, receiver will reject it");
        }
        self.clone()
    }

    fn decode(value: &Value, _buffers: &[Buffer]) -> Result<Self, DecodeError> {
        if contains_buffer_ref(value) {
            return Err(DecodeError::Invalid {
                expected: "json",
                message: "buffer reference marker in a free-form value".into(),
            });
        }
        Ok(value.clone())
    }
}

impl StateCodec for Buffer {
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value {
        let index = buffers.len();
        buffers.push(self.clone());
        buffer_ref(index)
    }

    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError> {
        let index = parse_buffer_ref(value)
            .ok_or_else(|| DecodeError::shape("buffer reference", value))?;
        buffers
            .get(index)
            .cloned()
            .ok_or(DecodeError::BufferOutOfRange {
                index,
                len: buffers.len(),
            })
    }
}

/// `None` is JSON `null`.
impl<T: StateCodec> StateCodec for Option<T> {
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value {
        match self {
            Some(v) => v.encode_into(buffers),
            None => Value::Null,
        }
    }

    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError> {
        match value {
            Value::Null => Ok(None),
            other => T::decode(other, buffers).map(Some),
        }
    }
}

fn decode_items<T: StateCodec>(value: &Value, buffers: &[Buffer]) -> Result<Vec<T>, DecodeError> {
    let items = value
        .as_array()
        .ok_or_else(|| DecodeError::shape("array", value))?;
    items.iter().map(|item| T::decode(item, buffers)).collect()
}

impl<T: StateCodec> StateCodec for Vec<T> {
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value {
        Value::Array(self.iter().map(|v| v.encode_into(buffers)).collect())
    }

    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError> {
        decode_items(value, buffers)
    }
}

impl<T: StateCodec, const N: usize> StateCodec for [T; N] {
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value {
        Value::Array(self.iter().map(|v| v.encode_into(buffers)).collect())
    }

    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError> {
        let items: Vec<T> = decode_items(value, buffers)?;
        let found = items.len();
        items
            .try_into()
            .map_err(|_| DecodeError::Length { expected: N, found })
    }
}

fn decode_entries<T: StateCodec>(
    value: &Value,
    buffers: &[Buffer],
) -> Result<Vec<(String, T)>, DecodeError> {
    let map = value
        .as_object()
        .ok_or_else(|| DecodeError::shape("object", value))?;
    map.iter()
        .map(|(k, v)| T::decode(v, buffers).map(|v| (k.clone(), v)))
        .collect()
}

impl<T: StateCodec> StateCodec for BTreeMap<String, T> {
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.encode_into(buffers)))
                .collect::<Map<_, _>>(),
        )
    }

    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError> {
        Ok(decode_entries(value, buffers)?.into_iter().collect())
    }
}

impl<T: StateCodec> StateCodec for IndexMap<String, T> {
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value {
        Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.encode_into(buffers)))
                .collect::<Map<_, _>>(),
        )
    }

    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError> {
        Ok(decode_entries(value, buffers)?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roundtrip<T: StateCodec + PartialEq + std::fmt::Debug>(v: T) {
        let encoded = v.encode();
        let back = T::decode(&encoded.value, &encoded.buffers).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_scalars_encode_without_payload() {
        assert_eq!(1.0f64.encode(), Encoded::value(json!(1.0)));
        assert_eq!(18i32.encode(), Encoded::value(json!(18)));
        assert_eq!(false.encode(), Encoded::value(json!(false)));
        assert_eq!("round".to_string().encode(), Encoded::value(json!("round")));
    }

    #[test]
    fn test_heatmap_points_roundtrip() {
        let points: Vec<[f64; 3]> = vec![[45.5, -73.6, 0.8], [46.0, -72.0, 0.1]];
        let encoded = points.encode();
        assert_eq!(encoded.value, json!([[45.5, -73.6, 0.8], [46.0, -72.0, 0.1]]));
        assert!(encoded.buffers.is_empty());
        roundtrip(points);
    }

    #[test]
    fn test_f32_roundtrip_is_exact() {
        roundtrip(0.05f32);
        roundtrip(15.0f32);
    }

    #[test]
    fn test_integer_accepted_for_float() {
        assert_eq!(f64::decode(&json!(2), &[]).unwrap(), 2.0);
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(
            f64::decode(&json!("1.0"), &[]),
            Err(DecodeError::Shape {
                expected: "f64",
                found: "string"
            })
        );
        assert_eq!(
            Vec::<f64>::decode(&json!({"a": 1}), &[]),
            Err(DecodeError::Shape {
                expected: "array",
                found: "object"
            })
        );
        assert!(matches!(
            String::decode(&json!(null), &[]),
            Err(DecodeError::Shape { found: "null", .. })
        ));
    }

    #[test]
    fn test_integer_overflow_is_invalid() {
        assert!(matches!(
            i32::decode(&json!(u64::MAX), &[]),
            Err(DecodeError::Invalid { expected: "i32", .. })
        ));
        assert!(matches!(
            u32::decode(&json!(-1), &[]),
            Err(DecodeError::Invalid { .. })
        ));
    }

    #[test]
    fn test_fixed_array_length_checked() {
        assert_eq!(
            <[f64; 2]>::decode(&json!([1.0, 2.0, 3.0]), &[]),
            Err(DecodeError::Length {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_string_map_roundtrip() {
        let mut gradient = BTreeMap::new();
        gradient.insert("0.4".to_string(), "blue".to_string());
        gradient.insert("1.0".to_string(), "red".to_string());
        assert_eq!(gradient.encode().value, json!({"0.4": "blue", "1.0": "red"}));
        roundtrip(gradient);
    }

    #[test]
    fn test_option_null() {
        assert_eq!(None::<String>.encode().value, Value::Null);
        roundtrip(Some("#ff0000".to_string()));
        roundtrip(None::<String>);
    }

    #[test]
    fn test_buffer_encodes_marker_and_payload() {
        let buf = Buffer::from(vec![1u8, 2, 3]);
        let encoded = buf.encode();
        assert_eq!(encoded.value, buffer_ref(0));
        assert_eq!(encoded.buffers, vec![buf.clone()]);
        roundtrip(buf);
    }

    #[test]
    fn test_nested_buffers_index_in_encounter_order() {
        let bufs = vec![Buffer::from(vec![1u8]), Buffer::from(vec![2u8, 2])];
        let encoded = bufs.encode();
        assert_eq!(encoded.value, json!([buffer_ref(0), buffer_ref(1)]));
        assert_eq!(encoded.buffers, bufs);
        roundtrip(bufs);
    }

    #[test]
    fn test_buffer_index_out_of_range() {
        assert_eq!(
            Buffer::decode(&buffer_ref(2), &[Buffer::from(vec![0u8])]),
            Err(DecodeError::BufferOutOfRange { index: 2, len: 1 })
        );
    }

    #[test]
    fn test_buffer_rejects_inline_data() {
        assert!(matches!(
            Buffer::decode(&json!([1, 2, 3]), &[]),
            Err(DecodeError::Shape { expected: "buffer reference", .. })
        ));
    }

    #[test]
    fn test_json_passthrough() {
        roundtrip(json!({"0.4": "blue", "nested": [1, {"x": null}]}));
        roundtrip(json!({"type": "bytes", "size": 4}));
    }

    #[test]
    fn test_json_rejects_marker_shaped_object() {
        let lookalike = json!({"stops": [{"type": "bytes", "index": 0}]});
        let encoded = lookalike.encode();
        assert_eq!(encoded.value, lookalike);
        assert!(encoded.buffers.is_empty());
        assert!(matches!(
            Value::decode(&encoded.value, &[Buffer::from(vec![1u8])]),
            Err(DecodeError::Invalid { expected: "json", .. })
        ));
    }

    #[test]
    fn test_non_finite_floats_encode_null_and_do_not_decode() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let encoded = v.encode();
            assert_eq!(encoded.value, Value::Null);
            assert_eq!(
                f64::decode(&encoded.value, &[]),
                Err(DecodeError::Shape {
                    expected: "f64",
                    found: "null"
                })
            );
        }
        assert_eq!(f32::NAN.encode().value, Value::Null);
    }
}
