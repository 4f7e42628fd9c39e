//! Polyline layer: an open path through a list of points.

use std::ops::{Deref, DerefMut};

use leafwire_state::{Comm, Property, StateFields, Widget, state_fields};

use crate::constants::{POLYLINE_MODEL, POLYLINE_VIEW};
use crate::{Layer, LayerBase, PathBase, WidgetBase, WidgetConfig};

/// `[lat, lng]`
pub type LatLng = [f64; 2];

const POLYLINE_OPTIONS: &[&str] = &["smooth_factor", "no_clip"];

#[derive(Debug)]
pub struct Polyline {
    path: PathBase,
    pub locations: Property<Vec<LatLng>>,
    pub smooth_factor: Property<f64>,
    pub no_clip: Property<bool>,
}

state_fields!(Polyline { base: path, fields: [locations, smooth_factor, no_clip] });

impl Widget for Polyline {}
impl Layer for Polyline {}

impl Polyline {
    pub fn new(comm: Comm, config: &WidgetConfig) -> Self {
        let widget = WidgetBase::new(comm, config, POLYLINE_MODEL, POLYLINE_VIEW);
        let mut path = PathBase::new(LayerBase::new(widget));
        path.extend_options(POLYLINE_OPTIONS);
        let comm = path.comm().clone();
        Self {
            locations: Property::new(&comm, "locations", Vec::new()),
            smooth_factor: Property::new(&comm, "smooth_factor", 1.0),
            no_clip: Property::new(&comm, "no_clip", false),
            path,
        }
    }
}

impl Default for Polyline {
    fn default() -> Self {
        Self::new(Comm::detached(), &WidgetConfig::default())
    }
}

impl Deref for Polyline {
    type Target = PathBase;

    fn deref(&self) -> &PathBase {
        &self.path
    }
}

impl DerefMut for Polyline {
    fn deref_mut(&mut self) -> &mut PathBase {
        &mut self.path
    }
}
