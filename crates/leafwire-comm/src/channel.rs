//! Transport over a tokio unbounded channel.
//!
//! ```text
//!   widgets (LocalSet, !Send)          mpsc           writer task
//!   Comm ──▶ ChannelTransport ──▶ UnboundedSender ──▶ UnboundedReceiver<CommMessage>
//! ```
//!
//! Sends never block and never fail toward the widget: a closed channel is
//! logged and counted here.

use std::cell::Cell;
use std::rc::Rc;

use leafwire_state::Transport;
use leafwire_types::{Envelope, WidgetId};
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::{CommMessage, TransportError};

pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<CommMessage>,
    target_name: String,
    dropped: Cell<u64>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::UnboundedSender<CommMessage>, target_name: impl Into<String>) -> Self {
        Self {
            tx,
            target_name: target_name.into(),
            dropped: Cell::new(0),
        }
    }

    /// A transport and the receiving end of its channel.
    pub fn channel(
        target_name: impl Into<String>,
    ) -> (Rc<Self>, mpsc::UnboundedReceiver<CommMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Rc::new(Self::new(tx, target_name)), rx)
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Messages lost because the receiver was gone.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn try_deliver(&self, message: CommMessage) -> Result<(), TransportError> {
        let comm_id = message.comm_id;
        let method = message.method();
        trace!(comm = %comm_id, method, "queueing comm message");
        self.tx
            .send(message)
            .map_err(|_| TransportError::Disconnected { comm_id, method })
    }

    fn deliver(&self, message: CommMessage) {
        if let Err(err) = self.try_deliver(message) {
            self.dropped.set(self.dropped.get() + 1);
            warn!(error = %err, dropped = self.dropped.get(), "comm message lost");
        }
    }
}

impl Transport for ChannelTransport {
    fn open(&self, id: WidgetId, state: Envelope) {
        self.deliver(CommMessage::open(id, self.target_name.clone(), state));
    }

    fn send_patch(&self, id: WidgetId, patch: Envelope) {
        self.deliver(CommMessage::update(id, patch));
    }

    fn close(&self, id: WidgetId) {
        self.deliver(CommMessage::close(id));
    }
}

#[cfg(test)]
mod tests {
    use leafwire_types::Encoded;
    use serde_json::json;

    use super::*;
    use crate::CommBody;

    #[test]
    fn test_messages_arrive_in_order() {
        let (transport, mut rx) = ChannelTransport::channel("jupyter.widget");
        let id = WidgetId::new();
        let mut patch = Envelope::new();
        patch.insert("max", Encoded::value(json!(2.0)));

        transport.open(id, Envelope::new());
        transport.send_patch(id, patch);
        transport.close(id);

        let methods: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|m| m.method())
            .collect();
        assert_eq!(methods, vec!["open", "update", "close"]);
        assert_eq!(transport.dropped(), 0);
    }

    #[test]
    fn test_open_carries_target_name() {
        let (transport, mut rx) = ChannelTransport::channel("leaflet.widget");
        transport.open(WidgetId::new(), Envelope::new());
        let message = rx.try_recv().unwrap();
        assert!(matches!(
            message.body,
            CommBody::Open { ref target_name, .. } if target_name == "leaflet.widget"
        ));
    }

    #[test]
    fn test_closed_channel_counts_drops() {
        let (transport, rx) = ChannelTransport::channel("jupyter.widget");
        drop(rx);
        assert!(transport.is_closed());

        transport.close(WidgetId::new());
        transport.send_patch(WidgetId::new(), Envelope::new());
        assert_eq!(transport.dropped(), 2);
    }

    #[test]
    fn test_disconnected_error_names_message() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let transport = ChannelTransport::new(tx, "jupyter.widget");
        let id = WidgetId::new();
        let err = transport.try_deliver(CommMessage::close(id)).unwrap_err();
        assert!(matches!(
            err,
            TransportError::Disconnected { comm_id, method: "close" } if comm_id == id
        ));
    }
}
