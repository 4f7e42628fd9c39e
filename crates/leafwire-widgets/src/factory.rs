//! Construction of opened widgets bound to one transport.

use std::cell::RefCell;
use std::rc::Rc;

use leafwire_state::{Comm, Transport, Widget, WidgetRegistry};
use tracing::debug;

use crate::{Heatmap, LayerGroup, Polyline, WidgetConfig};

/// A concrete widget type constructible from a comm and the catalog config.
pub trait Catalog: Widget + Sized {
    fn construct(comm: Comm, config: &WidgetConfig) -> Self;
}

impl Catalog for Heatmap {
    fn construct(comm: Comm, config: &WidgetConfig) -> Self {
        Heatmap::new(comm, config)
    }
}

impl Catalog for Polyline {
    fn construct(comm: Comm, config: &WidgetConfig) -> Self {
        Polyline::new(comm, config)
    }
}

impl Catalog for LayerGroup {
    fn construct(comm: Comm, config: &WidgetConfig) -> Self {
        LayerGroup::new(comm, config)
    }
}

/// Builds widgets, each with a fresh identity, already published.
pub struct WidgetFactory {
    transport: Rc<dyn Transport>,
    config: WidgetConfig,
}

impl WidgetFactory {
    pub fn new(transport: Rc<dyn Transport>, config: WidgetConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Construct `W` and open its comm with the default state.
    pub fn create<W: Catalog>(&self) -> W {
        self.create_with(|_| {})
    }

    /// Construct `W`, let `init` adjust it, then open its comm.
    ///
    /// Changes made in `init` are part of the initial state, not patches.
    pub fn create_with<W: Catalog>(&self, init: impl FnOnce(&mut W)) -> W {
        let comm = Comm::new(self.transport.clone());
        let mut widget = W::construct(comm, &self.config);
        init(&mut widget);
        widget.open();
        debug!(widget = %widget.id(), fields = widget.fields().len(), "created widget");
        widget
    }

    /// Like [`create`](Self::create), shared and registered in `registry`.
    pub fn create_shared<W: Catalog + 'static>(
        &self,
        registry: &mut WidgetRegistry,
    ) -> Rc<RefCell<W>> {
        let widget = Rc::new(RefCell::new(self.create::<W>()));
        registry.register(&widget);
        widget
    }

    pub fn heatmap(&self) -> Heatmap {
        self.create()
    }

    pub fn polyline(&self) -> Polyline {
        self.create()
    }

    pub fn layer_group(&self) -> LayerGroup {
        self.create()
    }
}

#[cfg(test)]
mod tests {
    use leafwire_state::{CommEvent, RecordingTransport};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_created_widgets_are_open_with_distinct_ids() {
        let transport = RecordingTransport::new();
        let factory = WidgetFactory::new(transport.clone(), WidgetConfig::default());
        let a = factory.heatmap();
        let b = factory.polyline();

        assert_ne!(a.id(), b.id());
        let opened: Vec<_> = transport.events().iter().map(CommEvent::id).collect();
        assert_eq!(opened, vec![a.id(), b.id()]);
    }

    #[test]
    fn test_init_is_part_of_open_state() {
        let transport = RecordingTransport::new();
        let factory = WidgetFactory::new(transport.clone(), WidgetConfig::default());
        let _heatmap: Heatmap = factory.create_with(|h: &mut Heatmap| h.radius.set(40.0));

        let events = transport.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            CommEvent::Open { state, .. } => assert_eq!(state.get("radius"), Some(&json!(40.0))),
            other => panic!("expected open, got {other:?}"),
        }
    }

    #[test]
    fn test_config_flows_into_base_fields() {
        let config = WidgetConfig {
            model_module_version: "^0.12.0".into(),
            ..WidgetConfig::default()
        };
        let factory = WidgetFactory::new(RecordingTransport::new(), config);
        let group = factory.layer_group();
        assert_eq!(group.model_module_version.get(), "^0.12.0");
    }

    #[test]
    fn test_shared_widgets_are_registered() {
        let factory = WidgetFactory::new(RecordingTransport::new(), WidgetConfig::default());
        let mut registry = WidgetRegistry::new();
        let line = factory.create_shared::<Polyline>(&mut registry);
        let id = line.borrow().id();
        assert!(registry.contains(id));
    }
}
