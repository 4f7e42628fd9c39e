//! Layer group: an ordered, synchronized set of child layers.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use leafwire_state::{ChildList, Comm, Holder, Property, StateFields, Widget, WidgetId, state_fields};

use crate::constants::{LAYER_GROUP_MODEL, LAYER_GROUP_VIEW};
use crate::{Layer, LayerBase, WidgetBase, WidgetConfig};

/// Every membership change sends a patch holding only `layers`.
#[derive(Debug)]
pub struct LayerGroup {
    layer: LayerBase,
    pub layers: Property<ChildList>,
}

state_fields!(LayerGroup { base: layer, fields: [layers] });

impl Widget for LayerGroup {}
impl Layer for LayerGroup {}

impl LayerGroup {
    pub fn new(comm: Comm, config: &WidgetConfig) -> Self {
        let widget = WidgetBase::new(comm, config, LAYER_GROUP_MODEL, LAYER_GROUP_VIEW);
        let layer = LayerBase::new(widget);
        let comm = layer.comm().clone();
        Self {
            layers: Property::new(&comm, "layers", ChildList::new()),
            layer,
        }
    }

    /// Take ownership of `layer`; it lives as long as the group holds it.
    pub fn add_layer<L: Layer + 'static>(&mut self, layer: L) -> WidgetId {
        let holder = Holder::owning(layer);
        let id = holder.id();
        self.layers.add(holder);
        id
    }

    /// Share ownership of a layer that other code also holds.
    pub fn add_shared_layer<L: Layer + 'static>(&mut self, layer: &Rc<RefCell<L>>) -> WidgetId {
        let holder = Holder::shared(layer);
        let id = holder.id();
        self.layers.add(holder);
        id
    }

    /// Reference a layer by identity without affecting its lifetime.
    pub fn add_layer_ref<L: Layer + ?Sized>(&mut self, layer: &L) -> WidgetId {
        let holder = Holder::referencing(layer);
        let id = holder.id();
        self.layers.add(holder);
        id
    }

    /// Remove every occurrence of `layer`. Returns how many.
    pub fn remove_layer<L: Layer + ?Sized>(&mut self, layer: &L) -> usize {
        self.layers.remove(layer.id())
    }

    pub fn remove_layer_id(&mut self, id: WidgetId) -> usize {
        self.layers.remove(id)
    }

    pub fn clear_layers(&mut self) {
        self.layers.clear();
    }

    pub fn layer_ids(&self) -> Vec<WidgetId> {
        self.layers.ids()
    }
}

impl Default for LayerGroup {
    fn default() -> Self {
        Self::new(Comm::detached(), &WidgetConfig::default())
    }
}

impl Deref for LayerGroup {
    type Target = LayerBase;

    fn deref(&self) -> &LayerBase {
        &self.layer
    }
}

impl DerefMut for LayerGroup {
    fn deref_mut(&mut self) -> &mut LayerBase {
        &mut self.layer
    }
}
