//! Comm wire messages.
//!
//! ```text
//! {"comm_id": "0192…", "method": "update", "state": {"max": 2.0}}
//! ```
//!
//! Binary payloads travel out of band next to the JSON text, in the order
//! the `{"type":"bytes","index":N}` markers reference them.

use leafwire_types::{Buffer, Envelope, EnvelopeError, WidgetId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoStaticStr;

use crate::TransportError;

/// Message body, tagged by `method`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "method", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommBody {
    /// A widget was created; `state` is its full snapshot.
    Open { target_name: String, state: Value },
    /// A (usually partial) state change.
    Update { state: Value },
    /// The widget was destroyed.
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommMessage {
    /// 32 lowercase hex chars, the `WidgetId` serde form.
    pub comm_id: WidgetId,
    #[serde(flatten)]
    pub body: CommBody,
    #[serde(skip)]
    pub buffers: Vec<Buffer>,
}

impl CommMessage {
    pub fn open(comm_id: WidgetId, target_name: impl Into<String>, state: Envelope) -> Self {
        let (state, buffers) = split(state);
        Self {
            comm_id,
            body: CommBody::Open {
                target_name: target_name.into(),
                state,
            },
            buffers,
        }
    }

    pub fn update(comm_id: WidgetId, patch: Envelope) -> Self {
        let (state, buffers) = split(patch);
        Self {
            comm_id,
            body: CommBody::Update { state },
            buffers,
        }
    }

    pub fn close(comm_id: WidgetId) -> Self {
        Self {
            comm_id,
            body: CommBody::Close,
            buffers: Vec::new(),
        }
    }

    pub fn method(&self) -> &'static str {
        (&self.body).into()
    }

    /// The carried state as an envelope; `None` for `close`.
    pub fn envelope(&self) -> Option<Result<Envelope, EnvelopeError>> {
        match &self.body {
            CommBody::Open { state, .. } | CommBody::Update { state } => {
                Some(Envelope::from_json(state.clone(), self.buffers.clone()))
            }
            CommBody::Close => None,
        }
    }

    /// JSON text of the message; buffers are not included.
    pub fn to_json_string(&self) -> Result<String, TransportError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse JSON text and reattach the out-of-band buffers.
    pub fn from_wire(text: &str, buffers: Vec<Buffer>) -> Result<Self, TransportError> {
        let mut message: Self = serde_json::from_str(text)?;
        message.buffers = buffers;
        Ok(message)
    }
}

fn split(envelope: Envelope) -> (Value, Vec<Buffer>) {
    let (state, buffers) = envelope.into_parts();
    (Value::Object(state.into_iter().collect()), buffers)
}
