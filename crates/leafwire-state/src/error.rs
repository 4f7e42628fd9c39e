//! Error types for state decoding.

use thiserror::Error;

/// A structured value or payload did not match a field's declared type.
///
/// Raised per field: the protocol rejects only the offending field's
/// assignment and keeps applying the rest of the envelope.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The JSON value has the wrong kind (e.g. a string where a number belongs).
    #[error("expected {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },

    /// The JSON kind is right but the value does not fit (e.g. integer overflow).
    #[error("invalid {expected}: {message}")]
    Invalid {
        expected: &'static str,
        message: String,
    },

    /// A fixed-size array arrived with the wrong number of elements.
    #[error("expected {expected} elements, found {found}")]
    Length { expected: usize, found: usize },

    /// A buffer reference marker points past the end of the payload list.
    #[error("buffer index {index} out of range ({len} buffers)")]
    BufferOutOfRange { index: usize, len: usize },

    /// A string where a widget reference (`IPY_MODEL_<hex>`) belongs.
    #[error("not a widget reference: {0:?}")]
    BadModelRef(String),
}

impl DecodeError {
    pub(crate) fn shape(expected: &'static str, found: &serde_json::Value) -> Self {
        Self::Shape {
            expected,
            found: leafwire_types::json_kind(found),
        }
    }

    pub(crate) fn invalid(expected: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Invalid {
            expected,
            message: err.to_string(),
        }
    }
}
