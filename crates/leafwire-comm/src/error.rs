//! Error types for the comm layer.

use leafwire_types::{EnvelopeError, WidgetId};
use thiserror::Error;

/// Failures delivering outbound messages. Never surfaced to widgets.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("comm channel closed, {method} for {comm_id} dropped")]
    Disconnected {
        comm_id: WidgetId,
        method: &'static str,
    },

    #[error("message encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures routing an inbound message to its widget.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no live widget for comm {0}")]
    UnknownWidget(WidgetId),

    #[error("unexpected inbound {method} for comm {comm_id}")]
    UnexpectedMethod {
        comm_id: WidgetId,
        method: &'static str,
    },

    #[error("widget {0} is busy")]
    Busy(WidgetId),

    #[error("malformed envelope: {0}")]
    Envelope(#[from] EnvelopeError),
}
