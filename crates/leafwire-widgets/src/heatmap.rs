//! Heatmap layer: weighted points rendered as a color-ramped density.

use std::ops::{Deref, DerefMut};

use leafwire_state::{Comm, Property, StateFields, Widget, state_fields};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_GRADIENT, HEATMAP_MODEL, HEATMAP_VIEW};
use crate::{Layer, LayerBase, RasterLayerBase, WidgetBase, WidgetConfig};

/// `[lat, lng, intensity]`
pub type WeightedPoint = [f64; 3];

const HEATMAP_OPTIONS: &[&str] = &["min_opacity", "max_zoom", "max", "radius", "blur", "gradient"];

#[derive(Debug)]
pub struct Heatmap {
    raster: RasterLayerBase,
    pub locations: Property<Vec<WeightedPoint>>,
    pub min_opacity: Property<f64>,
    pub max_zoom: Property<i32>,
    pub max: Property<f64>,
    pub radius: Property<f64>,
    pub blur: Property<f64>,
    /// Intensity stop (as a string key) to CSS color.
    pub gradient: Property<Value>,
}

state_fields!(Heatmap {
    base: raster,
    fields: [locations, min_opacity, max_zoom, max, radius, blur, gradient],
});

impl Widget for Heatmap {}
impl Layer for Heatmap {}

pub fn default_gradient() -> Value {
    let stops: Map<String, Value> = DEFAULT_GRADIENT
        .iter()
        .map(|(stop, color)| (stop.to_string(), Value::from(*color)))
        .collect();
    Value::Object(stops)
}

impl Heatmap {
    /// An unopened heatmap with default field values.
    pub fn new(comm: Comm, config: &WidgetConfig) -> Self {
        let widget = WidgetBase::new(comm, config, HEATMAP_MODEL, HEATMAP_VIEW);
        let mut layer = LayerBase::new(widget);
        layer.extend_options(HEATMAP_OPTIONS);
        let raster = RasterLayerBase::new(layer);
        let comm = raster.comm().clone();
        Self {
            locations: Property::new(&comm, "locations", Vec::new()),
            min_opacity: Property::new(&comm, "min_opacity", 0.05),
            max_zoom: Property::new(&comm, "max_zoom", 18),
            max: Property::new(&comm, "max", 1.0),
            radius: Property::new(&comm, "radius", 25.0),
            blur: Property::new(&comm, "blur", 15.0),
            gradient: Property::new(&comm, "gradient", default_gradient()),
            raster,
        }
    }

    /// Append one point.
    pub fn add_point(&mut self, point: WeightedPoint) {
        self.locations.update(|points| points.push(point));
    }
}

impl Default for Heatmap {
    fn default() -> Self {
        Self::new(Comm::detached(), &WidgetConfig::default())
    }
}

impl Deref for Heatmap {
    type Target = RasterLayerBase;

    fn deref(&self) -> &RasterLayerBase {
        &self.raster
    }
}

impl DerefMut for Heatmap {
    fn deref_mut(&mut self) -> &mut RasterLayerBase {
        &mut self.raster
    }
}
