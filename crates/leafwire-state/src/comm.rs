//! The outward-propagation seam: a per-widget [`Comm`] handle over a
//! [`Transport`].
//!
//! Every property cell of a widget shares its widget's `Comm`. A local
//! assignment hands a one-field patch to the transport before returning;
//! the core never waits on delivery.
//!
//! ```text
//!   Property::set ──▶ Comm (id, hold depth, opened) ──▶ dyn Transport
//!                                                       open / send_patch / close
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use leafwire_types::{Envelope, WidgetId};
use tracing::{debug, trace, warn};

/// External channel that moves envelopes to the remote renderer.
///
/// All calls are fire-and-forget. Delivery failures belong to the
/// transport: it reports them through its own error type, never back
/// into the widget.
pub trait Transport {
    /// Publish a widget's full state for the first time.
    fn open(&self, id: WidgetId, state: Envelope);

    /// Deliver a (usually partial) state update.
    fn send_patch(&self, id: WidgetId, patch: Envelope);

    /// The widget was destroyed.
    fn close(&self, id: WidgetId);
}

struct CommInner {
    id: WidgetId,
    transport: Rc<dyn Transport>,
    opened: Cell<bool>,
    hold_depth: Cell<u32>,
}

impl Drop for CommInner {
    fn drop(&mut self) {
        if self.opened.get() {
            debug!(widget = %self.id, "closing comm");
            self.transport.close(self.id);
        }
    }
}

/// Shared handle binding a widget's identity to its transport.
///
/// Cheap to clone. When the last clone drops (the widget is destroyed) an
/// opened comm sends `close`.
#[derive(Clone)]
pub struct Comm {
    inner: Rc<CommInner>,
}

impl Comm {
    /// A comm with a fresh identity.
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self::with_id(WidgetId::new(), transport)
    }

    pub fn with_id(id: WidgetId, transport: Rc<dyn Transport>) -> Self {
        Self {
            inner: Rc::new(CommInner {
                id,
                transport,
                opened: Cell::new(false),
                hold_depth: Cell::new(0),
            }),
        }
    }

    /// A comm whose traffic goes nowhere.
    pub fn detached() -> Self {
        Self::new(Rc::new(NullTransport))
    }

    pub fn id(&self) -> WidgetId {
        self.inner.id
    }

    pub fn is_open(&self) -> bool {
        self.inner.opened.get()
    }

    pub fn is_held(&self) -> bool {
        self.inner.hold_depth.get() > 0
    }

    /// Whether a local assignment should go out immediately.
    pub fn can_send(&self) -> bool {
        self.is_open() && !self.is_held()
    }

    /// Publish the full state. Only the first call reaches the transport.
    pub fn open(&self, state: Envelope) {
        if self.inner.opened.replace(true) {
            trace!(widget = %self.inner.id, "comm already open");
            return;
        }
        debug!(widget = %self.inner.id, fields = state.len(), "opening comm");
        self.inner.transport.open(self.inner.id, state);
    }

    /// Hand a patch to the transport. Dropped while the comm is unopened.
    pub fn send_patch(&self, patch: Envelope) {
        if !self.is_open() {
            trace!(widget = %self.inner.id, "comm not open, patch dropped");
            return;
        }
        if let Err(err) = patch.validate() {
            warn!(widget = %self.inner.id, error = %err, "outbound patch has dangling buffer refs");
        }
        trace!(widget = %self.inner.id, fields = patch.len(), "sending patch");
        self.inner.transport.send_patch(self.inner.id, patch);
    }

    pub(crate) fn hold(&self) {
        self.inner.hold_depth.set(self.inner.hold_depth.get() + 1);
    }

    /// Returns `true` when the outermost hold was released.
    pub(crate) fn release(&self) -> bool {
        let depth = self.inner.hold_depth.get().saturating_sub(1);
        self.inner.hold_depth.set(depth);
        depth == 0
    }
}

impl fmt::Debug for Comm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comm")
            .field("id", &self.inner.id)
            .field("opened", &self.inner.opened.get())
            .field("hold_depth", &self.inner.hold_depth.get())
            .finish()
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn open(&self, _id: WidgetId, _state: Envelope) {}
    fn send_patch(&self, _id: WidgetId, _patch: Envelope) {}
    fn close(&self, _id: WidgetId) {}
}

/// One call observed by a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommEvent {
    Open { id: WidgetId, state: Envelope },
    Patch { id: WidgetId, patch: Envelope },
    Close { id: WidgetId },
}

impl CommEvent {
    pub fn id(&self) -> WidgetId {
        match self {
            CommEvent::Open { id, .. } | CommEvent::Patch { id, .. } | CommEvent::Close { id } => {
                *id
            }
        }
    }
}

/// In-process transport that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    events: RefCell<Vec<CommEvent>>,
}

impl RecordingTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Everything recorded so far.
    pub fn events(&self) -> Vec<CommEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<CommEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Only the patches, in send order.
    pub fn patches(&self) -> Vec<(WidgetId, Envelope)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                CommEvent::Patch { id, patch } => Some((*id, patch.clone())),
                _ => None,
            })
            .collect()
    }

    /// The most recent patch, if any.
    pub fn last_patch(&self) -> Option<Envelope> {
        self.patches().pop().map(|(_, patch)| patch)
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl Transport for RecordingTransport {
    fn open(&self, id: WidgetId, state: Envelope) {
        self.events.borrow_mut().push(CommEvent::Open { id, state });
    }

    fn send_patch(&self, id: WidgetId, patch: Envelope) {
        self.events.borrow_mut().push(CommEvent::Patch { id, patch });
    }

    fn close(&self, id: WidgetId) {
        self.events.borrow_mut().push(CommEvent::Close { id });
    }
}
