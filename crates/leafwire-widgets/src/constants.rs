//! Widget catalog constants.
//!
//! Model and view names are fixed by the remote renderer; module names and
//! versions are only defaults and can be overridden through
//! [`WidgetConfig`](crate::WidgetConfig).

/// Frontend package implementing the models and views.
pub const DEFAULT_MODULE: &str = "jupyter-leaflet";

/// Semver range of the frontend package this catalog targets.
pub const DEFAULT_MODULE_VERSION: &str = "^0.11.0";

/// Comm target name the renderer listens on.
pub const DEFAULT_COMM_TARGET: &str = "jupyter.widget";

pub const HEATMAP_MODEL: &str = "LeafletHeatmapModel";
pub const HEATMAP_VIEW: &str = "LeafletHeatmapView";

pub const POLYLINE_MODEL: &str = "LeafletPolylineModel";
pub const POLYLINE_VIEW: &str = "LeafletPolylineView";

pub const LAYER_GROUP_MODEL: &str = "LeafletLayerGroupModel";
pub const LAYER_GROUP_VIEW: &str = "LeafletLayerGroupView";

/// Default stroke color for vector paths.
pub const DEFAULT_PATH_COLOR: &str = "#0033FF";

/// Default heatmap color ramp: intensity stop to CSS color.
pub const DEFAULT_GRADIENT: [(&str, &str); 5] = [
    ("0.4", "blue"),
    ("0.6", "cyan"),
    ("0.7", "lime"),
    ("0.8", "yellow"),
    ("1.0", "red"),
];
