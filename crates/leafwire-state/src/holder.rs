//! Type-erased handles to child widgets.
//!
//! A [`Holder`] either owns its widget (shared ownership: every clone keeps
//! the widget alive) or references it by identity only. Referencing holders
//! reach their widget through an explicit [`WidgetRegistry`], never through
//! global state.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use leafwire_types::{Buffer, Envelope, WidgetId};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ApplyReport, DecodeError, StateCodec, Widget};

/// A widget of statically unknown concrete type, shared single-threaded.
pub type SharedWidget = Rc<RefCell<dyn Widget>>;

/// Owning or referencing handle to a child widget.
#[derive(Clone)]
pub enum Holder {
    /// Keeps the widget alive while any clone survives.
    Owning { id: WidgetId, widget: SharedWidget },
    /// Identity only; has no effect on the widget's lifetime.
    Referencing(WidgetId),
}

impl Holder {
    /// Take ownership of a widget value.
    pub fn owning<W: Widget + 'static>(widget: W) -> Self {
        let id = widget.id();
        Self::Owning {
            id,
            widget: Rc::new(RefCell::new(widget)),
        }
    }

    /// Share ownership of a widget that is already behind `Rc<RefCell<_>>`.
    ///
    /// # Panics
    ///
    /// If the widget is currently mutably borrowed.
    pub fn shared<W: Widget + 'static>(widget: &Rc<RefCell<W>>) -> Self {
        let id = widget.borrow().id();
        Self::Owning {
            id,
            widget: widget.clone(),
        }
    }

    /// Capture only the identity of an existing widget.
    pub fn referencing<W: Widget + ?Sized>(widget: &W) -> Self {
        Self::Referencing(widget.id())
    }

    pub fn from_id(id: WidgetId) -> Self {
        Self::Referencing(id)
    }

    /// Stable identity, whatever the mode.
    pub fn id(&self) -> WidgetId {
        match self {
            Holder::Owning { id, .. } => *id,
            Holder::Referencing(id) => *id,
        }
    }

    pub fn is_owning(&self) -> bool {
        matches!(self, Holder::Owning { .. })
    }

    /// Reach the widget: directly when owning, via `registry` when referencing.
    pub fn resolve(&self, registry: &WidgetRegistry) -> Option<SharedWidget> {
        match self {
            Holder::Owning { widget, .. } => Some(widget.clone()),
            Holder::Referencing(id) => registry.get(*id),
        }
    }

    /// Full state of the held widget.
    ///
    /// `None` when the widget cannot be reached or is mutably borrowed.
    pub fn serialize_state(&self, registry: &WidgetRegistry) -> Option<Envelope> {
        let widget = self.resolve(registry)?;
        let state = match widget.try_borrow() {
            Ok(w) => w.serialize_state(),
            Err(_) => {
                warn!(widget = %self.id(), "child widget busy, cannot serialize");
                return None;
            }
        };
        Some(state)
    }

    /// Apply a patch to the held widget.
    ///
    /// `None` when the widget cannot be reached or is already borrowed.
    pub fn apply_patch(&self, registry: &WidgetRegistry, patch: &Envelope) -> Option<ApplyReport> {
        let widget = self.resolve(registry)?;
        let report = match widget.try_borrow_mut() {
            Ok(mut w) => w.apply_patch(patch),
            Err(_) => {
                warn!(widget = %self.id(), "child widget busy, patch not applied");
                return None;
            }
        };
        Some(report)
    }
}

/// Holders compare by identity.
impl PartialEq for Holder {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Holder {}

impl fmt::Debug for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Owning { id, .. } => write!(f, "Owning({id:?})"),
            Holder::Referencing(id) => write!(f, "Referencing({id:?})"),
        }
    }
}

/// On the wire a holder is the widget reference string `IPY_MODEL_<hex>`.
impl StateCodec for Holder {
    fn encode_into(&self, _buffers: &mut Vec<Buffer>) -> Value {
        Value::String(self.id().to_model_ref())
    }

    fn decode(value: &Value, _buffers: &[Buffer]) -> Result<Self, DecodeError> {
        let s = value
            .as_str()
            .ok_or_else(|| DecodeError::shape("widget reference", value))?;
        WidgetId::from_model_ref(s)
            .map(Holder::Referencing)
            .ok_or_else(|| DecodeError::BadModelRef(s.to_string()))
    }

    /// Same identity keeps the current holder and its ownership.
    fn merge_from_patch(current: &Self, incoming: Self) -> Self {
        if current.id() == incoming.id() {
            current.clone()
        } else {
            incoming
        }
    }
}

/// Identity to widget lookup for referencing holders.
///
/// Holds weak references only: registering a widget never extends its life.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: HashMap<WidgetId, Weak<RefCell<dyn Widget>>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type-erased widget under its identity.
    ///
    /// # Panics
    ///
    /// If the widget is currently mutably borrowed.
    pub fn insert(&mut self, widget: &SharedWidget) -> WidgetId {
        let id = widget.borrow().id();
        debug!(widget = %id, "registering widget");
        self.widgets.insert(id, Rc::downgrade(widget));
        id
    }

    /// Register a concrete widget.
    pub fn register<W: Widget + 'static>(&mut self, widget: &Rc<RefCell<W>>) -> WidgetId {
        let shared: SharedWidget = widget.clone();
        self.insert(&shared)
    }

    /// Live widget for `id`, if it is registered and still alive.
    pub fn get(&self, id: WidgetId) -> Option<SharedWidget> {
        self.widgets.get(&id).and_then(Weak::upgrade)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: WidgetId) -> bool {
        self.widgets.remove(&id).is_some()
    }

    /// Forget entries whose widget has been destroyed. Returns how many.
    pub fn prune(&mut self) -> usize {
        let before = self.widgets.len();
        self.widgets.retain(|_, w| w.strong_count() > 0);
        before - self.widgets.len()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("len", &self.widgets.len())
            .finish()
    }
}
