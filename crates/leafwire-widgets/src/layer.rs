//! Intermediate levels of the map layer hierarchy.
//!
//! Each level extends the `options` list with the names of its own fields
//! that the renderer forwards as layer options.

use std::ops::{Deref, DerefMut};

use leafwire_state::{Comm, Property, StateFields, Widget, state_fields};

use crate::constants::DEFAULT_PATH_COLOR;
use crate::WidgetBase;

/// A widget that can be placed in a [`LayerGroup`](crate::LayerGroup).
pub trait Layer: Widget {}

/// Fields common to every map layer.
#[derive(Debug)]
pub struct LayerBase {
    widget: WidgetBase,
    pub name: Property<String>,
    pub base: Property<bool>,
    pub bottom: Property<bool>,
    pub popup_min_width: Property<i32>,
    pub popup_max_width: Property<i32>,
    pub pane: Property<String>,
    pub options: Property<Vec<String>>,
}

state_fields!(LayerBase {
    base: widget,
    fields: [name, base, bottom, popup_min_width, popup_max_width, pane, options],
});

impl LayerBase {
    pub fn new(widget: WidgetBase) -> Self {
        let comm = widget.comm().clone();
        Self {
            name: Property::new(&comm, "name", String::new()),
            base: Property::new(&comm, "base", false),
            bottom: Property::new(&comm, "bottom", false),
            popup_min_width: Property::new(&comm, "popup_min_width", 50),
            popup_max_width: Property::new(&comm, "popup_max_width", 300),
            pane: Property::new(&comm, "pane", String::new()),
            options: Property::new(&comm, "options", Vec::new()),
            widget,
        }
    }

    /// Append option names declared by a derived level.
    pub(crate) fn extend_options(&mut self, names: &[&str]) {
        self.options
            .update(|options| options.extend(names.iter().map(|n| n.to_string())));
    }
}

impl Deref for LayerBase {
    type Target = WidgetBase;

    fn deref(&self) -> &WidgetBase {
        &self.widget
    }
}

impl DerefMut for LayerBase {
    fn deref_mut(&mut self) -> &mut WidgetBase {
        &mut self.widget
    }
}

/// Tile-like layers drawn as a single image.
#[derive(Debug)]
pub struct RasterLayerBase {
    layer: LayerBase,
    pub opacity: Property<f64>,
    pub visible: Property<bool>,
}

state_fields!(RasterLayerBase { base: layer, fields: [opacity, visible] });

impl RasterLayerBase {
    pub fn new(layer: LayerBase) -> Self {
        let comm = layer.comm().clone();
        Self {
            opacity: Property::new(&comm, "opacity", 1.0),
            visible: Property::new(&comm, "visible", true),
            layer,
        }
    }
}

impl Deref for RasterLayerBase {
    type Target = LayerBase;

    fn deref(&self) -> &LayerBase {
        &self.layer
    }
}

impl DerefMut for RasterLayerBase {
    fn deref_mut(&mut self) -> &mut LayerBase {
        &mut self.layer
    }
}

const PATH_OPTIONS: &[&str] = &[
    "stroke",
    "color",
    "weight",
    "fill",
    "fill_color",
    "fill_opacity",
    "dash_array",
    "line_cap",
    "line_join",
    "pointer_events",
    "class_name",
    "opacity",
];

/// Vector shapes: stroke and fill styling.
#[derive(Debug)]
pub struct PathBase {
    layer: LayerBase,
    pub stroke: Property<bool>,
    pub color: Property<String>,
    pub weight: Property<i32>,
    pub fill: Property<bool>,
    pub fill_color: Property<Option<String>>,
    pub fill_opacity: Property<f64>,
    pub dash_array: Property<Option<String>>,
    pub line_cap: Property<String>,
    pub line_join: Property<String>,
    pub pointer_events: Property<String>,
    pub class_name: Property<String>,
    pub opacity: Property<f64>,
}

state_fields!(PathBase {
    base: layer,
    fields: [
        stroke,
        color,
        weight,
        fill,
        fill_color,
        fill_opacity,
        dash_array,
        line_cap,
        line_join,
        pointer_events,
        class_name,
        opacity,
    ],
});

impl PathBase {
    pub fn new(mut layer: LayerBase) -> Self {
        layer.extend_options(PATH_OPTIONS);
        let comm: Comm = layer.comm().clone();
        Self {
            stroke: Property::new(&comm, "stroke", true),
            color: Property::new(&comm, "color", DEFAULT_PATH_COLOR.to_string()),
            weight: Property::new(&comm, "weight", 5),
            fill: Property::new(&comm, "fill", true),
            fill_color: Property::new(&comm, "fill_color", None),
            fill_opacity: Property::new(&comm, "fill_opacity", 0.2),
            dash_array: Property::new(&comm, "dash_array", None),
            line_cap: Property::new(&comm, "line_cap", "round".to_string()),
            line_join: Property::new(&comm, "line_join", "round".to_string()),
            pointer_events: Property::new(&comm, "pointer_events", String::new()),
            class_name: Property::new(&comm, "class_name", String::new()),
            opacity: Property::new(&comm, "opacity", 1.0),
            layer,
        }
    }
}

impl Deref for PathBase {
    type Target = LayerBase;

    fn deref(&self) -> &LayerBase {
        &self.layer
    }
}

impl DerefMut for PathBase {
    fn deref_mut(&mut self) -> &mut LayerBase {
        &mut self.layer
    }
}
