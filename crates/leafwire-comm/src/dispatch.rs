//! Inbound routing: comm messages from the renderer to their widgets.

use std::cell::RefCell;
use std::rc::Rc;

use leafwire_state::{ApplyReport, Widget, WidgetId, WidgetRegistry};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{CommBody, CommMessage, DispatchError};

/// Applies inbound updates one at a time, in arrival order.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: WidgetRegistry,
}

impl Dispatcher {
    pub fn new(registry: WidgetRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.registry
    }

    /// Make a widget reachable by its comm id.
    pub fn register<W: Widget + 'static>(&mut self, widget: &Rc<RefCell<W>>) -> WidgetId {
        self.registry.register(widget)
    }

    /// Route one message.
    ///
    /// `update` is applied as a patch. `close` from the renderer forgets the
    /// widget. `open` only ever flows outward.
    pub fn dispatch(&mut self, message: CommMessage) -> Result<ApplyReport, DispatchError> {
        let comm_id = message.comm_id;
        match message.body {
            CommBody::Update { state } => {
                let patch = leafwire_types::Envelope::from_json(state, message.buffers)?;
                let widget = self
                    .registry
                    .get(comm_id)
                    .ok_or(DispatchError::UnknownWidget(comm_id))?;
                let mut widget = widget
                    .try_borrow_mut()
                    .map_err(|_| DispatchError::Busy(comm_id))?;
                let report = widget.apply_patch(&patch);
                debug!(
                    comm = %comm_id,
                    applied = report.applied.len(),
                    rejected = report.rejected.len(),
                    unknown = report.unknown.len(),
                    "applied inbound update"
                );
                Ok(report)
            }
            CommBody::Close => {
                if !self.registry.remove(comm_id) {
                    return Err(DispatchError::UnknownWidget(comm_id));
                }
                debug!(comm = %comm_id, "renderer closed comm");
                Ok(ApplyReport::default())
            }
            CommBody::Open { .. } => Err(DispatchError::UnexpectedMethod {
                comm_id,
                method: "open",
            }),
        }
    }

    /// Drain `rx` until every sender is gone. Returns how many messages
    /// were applied cleanly.
    ///
    /// Widgets are `!Send`: run this on a `LocalSet` or with `block_on`.
    pub async fn run(&mut self, mut rx: mpsc::UnboundedReceiver<CommMessage>) -> usize {
        let mut applied = 0;
        while let Some(message) = rx.recv().await {
            let comm_id = message.comm_id;
            match self.dispatch(message) {
                Ok(report) if report.is_clean() => applied += 1,
                Ok(report) => {
                    warn!(comm = %comm_id, rejected = ?report.rejected, "update partially rejected");
                }
                Err(err) => warn!(comm = %comm_id, error = %err, "inbound message dropped"),
            }
        }
        debug!(applied, "dispatcher shutting down: channel closed");
        self.registry.prune();
        applied
    }
}
