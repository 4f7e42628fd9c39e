//! Root level shared by every widget: the model/view coordinates the
//! renderer uses to pick an implementation.

use leafwire_state::{Comm, Property, state_fields};

use crate::WidgetConfig;

/// Root of every widget hierarchy. Owns the widget's [`Comm`].
#[derive(Debug)]
pub struct WidgetBase {
    comm: Comm,
    pub model_module: Property<String>,
    pub model_module_version: Property<String>,
    pub model_name: Property<String>,
    pub view_module: Property<String>,
    pub view_module_version: Property<String>,
    pub view_name: Property<String>,
}

state_fields!(WidgetBase {
    comm: comm,
    fields: [
        model_module,
        model_module_version,
        model_name,
        view_module,
        view_module_version,
        view_name,
    ],
});

impl WidgetBase {
    pub fn new(comm: Comm, config: &WidgetConfig, model_name: &str, view_name: &str) -> Self {
        let text = |name, value: &str| Property::new(&comm, name, value.to_string());
        Self {
            model_module: text("_model_module", &config.model_module),
            model_module_version: text("_model_module_version", &config.model_module_version),
            model_name: text("_model_name", model_name),
            view_module: text("_view_module", &config.view_module),
            view_module_version: text("_view_module_version", &config.view_module_version),
            view_name: text("_view_name", view_name),
            comm,
        }
    }
}
