//! Ordered child collection of a composite widget.
//!
//! Membership changes go through [`Property<ChildList>`], so each `add`,
//! `remove` or `clear` pushes a patch holding only the children field.

use std::ops::Deref;

use leafwire_types::{Buffer, WidgetId};
use serde_json::Value;
use tracing::debug;

use crate::{DecodeError, Holder, Property, StateCodec};

/// Children in rendering order. Duplicate identities are allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildList(Vec<Holder>);

impl ChildList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.0.iter().map(Holder::id).collect()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.0.iter().any(|h| h.id() == id)
    }

    pub fn into_inner(self) -> Vec<Holder> {
        self.0
    }
}

impl Deref for ChildList {
    type Target = [Holder];

    fn deref(&self) -> &[Holder] {
        &self.0
    }
}

impl From<Vec<Holder>> for ChildList {
    fn from(holders: Vec<Holder>) -> Self {
        Self(holders)
    }
}

impl FromIterator<Holder> for ChildList {
    fn from_iter<I: IntoIterator<Item = Holder>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl StateCodec for ChildList {
    fn encode_into(&self, buffers: &mut Vec<Buffer>) -> Value {
        self.0.encode_into(buffers)
    }

    fn decode(value: &Value, buffers: &[Buffer]) -> Result<Self, DecodeError> {
        Vec::<Holder>::decode(value, buffers).map(Self)
    }

    /// Reconcile by identity: known children keep their holder (and
    /// ownership), new ones arrive as references.
    fn merge_from_patch(current: &Self, incoming: Self) -> Self {
        incoming
            .0
            .into_iter()
            .map(|holder| {
                current
                    .0
                    .iter()
                    .find(|h| h.id() == holder.id())
                    .cloned()
                    .unwrap_or(holder)
            })
            .collect()
    }
}

impl Property<ChildList> {
    /// Append a child at the end.
    pub fn add(&mut self, holder: Holder) {
        debug!(field = self.name(), child = %holder.id(), owning = holder.is_owning(), "adding child");
        self.update(|children| children.0.push(holder));
    }

    /// Remove every child with identity `id`. Returns how many went.
    ///
    /// Absent identities are a no-op, but the children field is still sent.
    pub fn remove(&mut self, id: WidgetId) -> usize {
        let mut removed = 0;
        self.update(|children| {
            let before = children.0.len();
            children.0.retain(|h| h.id() != id);
            removed = before - children.0.len();
        });
        debug!(field = self.name(), child = %id, removed, "removed child");
        removed
    }

    pub fn clear(&mut self) {
        debug!(field = self.name(), count = self.get().len(), "clearing children");
        self.update(|children| children.0.clear());
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.get().ids()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Comm, Envelope, RecordingTransport, Widget};

    struct Tile {
        comm: Comm,
        url: Property<String>,
    }

    crate::state_fields!(Tile { comm: comm, fields: [url] });

    impl Widget for Tile {}

    fn tile() -> Tile {
        let comm = Comm::detached();
        Tile {
            url: Property::new(&comm, "url", String::new()),
            comm,
        }
    }

    fn group() -> (std::rc::Rc<RecordingTransport>, Property<ChildList>) {
        let transport = RecordingTransport::new();
        let comm = Comm::new(transport.clone());
        comm.open(Envelope::new());
        transport.take();
        (transport, Property::new(&comm, "layers", ChildList::new()))
    }

    fn refs(ids: &[WidgetId]) -> Value {
        Value::Array(ids.iter().map(|id| json!(id.to_model_ref())).collect())
    }

    #[test]
    fn test_add_pushes_children_patch_in_order() {
        let (transport, mut layers) = group();
        let (a, b) = (WidgetId::new(), WidgetId::new());
        layers.add(Holder::from_id(a));
        layers.add(Holder::from_id(b));

        assert_eq!(layers.ids(), vec![a, b]);
        let patch = transport.last_patch().unwrap();
        assert_eq!(patch.to_json(), json!({ "layers": refs(&[a, b]) }));
        assert_eq!(transport.patches().len(), 2);
    }

    #[test]
    fn test_remove_first_of_two() {
        let (transport, mut layers) = group();
        let (a, b) = (WidgetId::new(), WidgetId::new());
        layers.add(Holder::from_id(a));
        layers.add(Holder::from_id(b));

        assert_eq!(layers.remove(a), 1);
        assert_eq!(
            transport.last_patch().unwrap().to_json(),
            json!({ "layers": refs(&[b]) })
        );
    }

    #[test]
    fn test_remove_drops_every_match() {
        let (_t, mut layers) = group();
        let (a, b) = (WidgetId::new(), WidgetId::new());
        for id in [a, b, a] {
            layers.add(Holder::from_id(id));
        }
        assert_eq!(layers.remove(a), 2);
        assert_eq!(layers.ids(), vec![b]);
    }

    #[test]
    fn test_remove_absent_is_noop_but_sends() {
        let (transport, mut layers) = group();
        let a = WidgetId::new();
        layers.add(Holder::from_id(a));
        transport.take();

        assert_eq!(layers.remove(WidgetId::new()), 0);
        assert_eq!(layers.ids(), vec![a]);
        assert_eq!(transport.patches().len(), 1);
    }

    #[test]
    fn test_add_then_remove_restores() {
        let (_t, mut layers) = group();
        let a = WidgetId::new();
        layers.add(Holder::from_id(a));
        let before = layers.get().clone();

        let b = WidgetId::new();
        layers.add(Holder::from_id(b));
        layers.remove(b);
        assert_eq!(*layers.get(), before);
    }

    #[test]
    fn test_clear() {
        let (transport, mut layers) = group();
        layers.add(Holder::from_id(WidgetId::new()));
        layers.clear();
        assert!(layers.get().is_empty());
        assert_eq!(
            transport.last_patch().unwrap().to_json(),
            json!({ "layers": [] })
        );
    }

    #[test]
    fn test_inbound_patch_reconciles_by_identity() {
        let (transport, mut layers) = group();
        let owned = Holder::owning(tile());
        let kept = owned.id();
        layers.add(owned);
        transport.take();

        let fresh = WidgetId::new();
        let env = Envelope::from_json(json!({ "layers": refs(&[fresh, kept]) }), Vec::new())
            .unwrap();
        let mut report = crate::ApplyReport::default();
        layers.read_from(&env, &mut report);

        assert!(report.was_applied("layers"));
        assert_eq!(layers.ids(), vec![fresh, kept]);
        assert!(!layers.get()[0].is_owning());
        assert!(layers.get()[1].is_owning());
        assert!(transport.is_empty());
    }

    #[test]
    fn test_bad_reference_rejects_whole_field() {
        let (_t, mut layers) = group();
        let a = WidgetId::new();
        layers.add(Holder::from_id(a));

        let env = Envelope::from_json(json!({ "layers": ["nope"] }), Vec::new()).unwrap();
        let mut report = crate::ApplyReport::default();
        layers.read_from(&env, &mut report);

        assert_eq!(report.rejected.len(), 1);
        assert_eq!(layers.ids(), vec![a]);
    }
}
