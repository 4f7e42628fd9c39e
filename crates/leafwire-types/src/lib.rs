//! Shared identity and wire types for leafwire.
//!
//! This crate has **no internal leafwire dependencies**: a pure leaf crate
//! that the state core, the widget catalog and the transports build on.
//!
//! # Key Types
//!
//! |----------------|-------------------------------------------------------|
//! | Type           | Purpose                                               |
//! |----------------|-------------------------------------------------------|
//! | [`WidgetId`]   | Stable identity of one mirrored widget                |
//! | [`Buffer`]     | Opaque out-of-band byte block                         |
//! | [`Encoded`]    | One field's encoded value plus its local buffers      |
//! | [`Envelope`]   | Structured field values plus ordered binary payloads  |
//! |----------------|-------------------------------------------------------|

pub mod envelope;
pub mod ids;

pub use envelope::{
    buffer_ref, contains_buffer_ref, json_kind, parse_buffer_ref, Buffer, Encoded, Envelope,
    EnvelopeError, BUFFER_REF_TYPE,
};
pub use ids::{WidgetId, MODEL_REF_PREFIX};
