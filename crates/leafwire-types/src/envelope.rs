//! The patch envelope: structured field values plus out-of-band buffers.
//!
//! A field whose natural representation is bulk binary data does not inline
//! its bytes. Its JSON value carries a reference marker instead:
//!
//! ```text
//! state:   { "locations": [[45.5, -73.6, 0.8]], "image": {"type": "bytes", "index": 0} }
//! buffers: [ <raw bytes of image> ]
//! ```
//!
//! Markers always index into the envelope's own `buffers`. When a field is
//! encoded on its own (see [`Encoded`]) its markers start at 0, and
//! [`Envelope::insert`] rewrites them to the cumulative index.

use std::ops::Deref;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Value of the `type` key in a buffer reference marker.
pub const BUFFER_REF_TYPE: &str = "bytes";

/// Build a buffer reference marker: `{"type":"bytes","index":N}`.
pub fn buffer_ref(index: usize) -> Value {
    json!({ "type": BUFFER_REF_TYPE, "index": index })
}

/// Recognize a buffer reference marker and return its index.
///
/// Only an object with exactly the `type` and `index` keys qualifies, so
/// ordinary JSON objects that happen to carry a `type` key pass through.
pub fn parse_buffer_ref(value: &Value) -> Option<usize> {
    let obj = value.as_object()?;
    if obj.len() != 2 || obj.get("type")?.as_str()? != BUFFER_REF_TYPE {
        return None;
    }
    obj.get("index")?.as_u64().map(|i| i as usize)
}

/// Visit every buffer reference marker inside `value`, depth first.
fn for_each_ref_mut(value: &mut Value, f: &mut impl FnMut(&mut usize)) {
    if let Some(mut index) = parse_buffer_ref(value) {
        f(&mut index);
        *value = buffer_ref(index);
        return;
    }
    match value {
        Value::Array(items) => items.iter_mut().for_each(|v| for_each_ref_mut(v, f)),
        Value::Object(map) => map.values_mut().for_each(|v| for_each_ref_mut(v, f)),
        _ => {}
    }
}

/// Whether any buffer reference marker appears anywhere inside `value`.
pub fn contains_buffer_ref(value: &Value) -> bool {
    let mut refs = Vec::new();
    collect_refs(value, &mut refs);
    !refs.is_empty()
}

fn collect_refs(value: &Value, out: &mut Vec<usize>) {
    if let Some(index) = parse_buffer_ref(value) {
        out.push(index);
        return;
    }
    match value {
        Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_refs(v, out)),
        _ => {}
    }
}

/// An opaque block of bytes carried next to the structured state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// One value encoded on its own: markers in `value` index into `buffers`
/// starting at 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Encoded {
    pub value: Value,
    pub buffers: Vec<Buffer>,
}

impl Encoded {
    /// A structured value with no binary payload.
    pub fn value(value: Value) -> Self {
        Self { value, buffers: Vec::new() }
    }
}

/// Errors raised while building or validating an envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The structured part of an inbound envelope was not a JSON object.
    #[error("envelope state must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A reference marker points past the end of the buffer list.
    #[error("field '{field}' references buffer {index} but the envelope holds {len}")]
    DanglingBufferRef {
        field: String,
        index: usize,
        len: usize,
    },
}

/// A full or partial encoded snapshot of a widget's fields.
///
/// Field order is insertion order, which for a serialized widget is its
/// base-to-derived field order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    state: IndexMap<String, Value>,
    buffers: Vec<Buffer>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inbound envelope from its wire parts.
    ///
    /// Dangling buffer references are left in place; decoding the affected
    /// field reports them so the rest of the envelope still applies.
    pub fn from_json(state: Value, buffers: Vec<Buffer>) -> Result<Self, EnvelopeError> {
        match state {
            Value::Object(map) => Ok(Self {
                state: map.into_iter().collect(),
                buffers,
            }),
            other => Err(EnvelopeError::NotAnObject(json_kind(&other))),
        }
    }

    /// Add (or replace) one field, rewriting its buffer references to the
    /// cumulative index.
    pub fn insert(&mut self, name: impl Into<String>, encoded: Encoded) {
        let name = name.into();
        if self.state.contains_key(&name) {
            self.remove(&name);
        }

        let Encoded { mut value, buffers } = encoded;
        let offset = self.buffers.len();
        if offset > 0 && !buffers.is_empty() {
            for_each_ref_mut(&mut value, &mut |index| *index += offset);
        }
        self.buffers.extend(buffers);
        self.state.insert(name, value);
    }

    /// Remove one field together with the buffers only it referenced.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let value = self.state.shift_remove(name)?;

        let len = self.buffers.len();
        let mut dropped = Vec::new();
        collect_refs(&value, &mut dropped);
        dropped.retain(|&i| i < len);
        dropped.sort_unstable();
        dropped.dedup();
        if dropped.is_empty() {
            return Some(value);
        }

        for &index in dropped.iter().rev() {
            self.buffers.remove(index);
        }
        for other in self.state.values_mut() {
            // Markers past the end never pointed at a payload; leave them as is
            for_each_ref_mut(other, &mut |index| {
                if *index < len {
                    *index -= dropped.iter().filter(|&&d| d < *index).count();
                }
            });
        }
        Some(value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.state.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.contains_key(name)
    }

    /// Field names in envelope order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn state(&self) -> &IndexMap<String, Value> {
        &self.state
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn into_parts(self) -> (IndexMap<String, Value>, Vec<Buffer>) {
        (self.state, self.buffers)
    }

    /// The structured part as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.state
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Check that every buffer reference resolves.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        let len = self.buffers.len();
        for (field, value) in &self.state {
            let mut refs = Vec::new();
            collect_refs(value, &mut refs);
            if let Some(&index) = refs.iter().find(|&&i| i >= len) {
                return Err(EnvelopeError::DanglingBufferRef {
                    field: field.clone(),
                    index,
                    len,
                });
            }
        }
        Ok(())
    }
}

/// Short name of a JSON value's kind, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
